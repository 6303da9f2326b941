use thesis_application::Notice;
use thesis_core::config::ClientConfig;
use thesis_core::ThesisError;
use thesis_infrastructure::ConfigService;

pub fn show(service: &ConfigService, config: &ClientConfig) -> Notice {
    match toml::to_string_pretty(config) {
        Ok(rendered) => {
            print!("{rendered}");
            Notice::success(
                "Effective configuration",
                format!("file: {}", service.path().display()),
            )
        }
        Err(err) => Notice::error("Configuration", &ThesisError::from(err)),
    }
}

/// Writes the effective configuration, refusing to replace an existing file unless forced.
pub fn init(service: &ConfigService, config: &ClientConfig, force: bool) -> Notice {
    if service.path().exists() && !force {
        let err = ThesisError::validation(
            "config",
            format!("{} already exists; pass --force to replace it", service.path().display()),
        );
        return Notice::error("Configuration", &err);
    }
    let outcome = service.save_config(config);
    Notice::from_outcome("Configuration", &outcome, |_| {
        format!("Wrote {}", service.path().display())
    })
}
