//! Fuzz harness for `BindingConfig` loading.
//!
//! Arbitrary text is fed to both the TOML and JSON loaders; whatever loads
//! must either validate into settings whose path round-trips through its
//! dotted form, or fail with a typed error.

#![no_main]
use formsync_core::{BindingConfig, RecordPath};
use libfuzzer_sys::fuzz_target;

fn check(config: &BindingConfig) {
    if let Ok(settings) = config.validate() {
        let reparsed = RecordPath::parse(&settings.path.to_string());
        assert_eq!(reparsed.as_ref(), Ok(&settings.path));
    }
}

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = BindingConfig::from_toml_str(text) {
        check(&config);
    }
    if let Ok(config) = BindingConfig::from_json_str(text) {
        check(&config);
    }
});
