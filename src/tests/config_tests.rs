use crate::config::AppConfig;

#[test]
fn test_parse_ini() {
    let mut config = AppConfig::default();
    let ini = r#"
# comment
PORT="7093"
VOLUMES="/mnt/disk1, /mnt/disk2,"
VOLUME="/mnt/disk2"
PREFERRED_VOLUME="^/mnt/disk\d+$"
AUTOSTART="no"
UNKNOWN_KEY="ignored"
"#;
    config.parse_ini(ini);
    assert_eq!(config.port, 7093);
    assert_eq!(config.volumes, vec!["/mnt/disk1".to_string(), "/mnt/disk2".to_string()]);
    assert_eq!(config.volume.as_deref(), Some("/mnt/disk2"));
    assert_eq!(config.preferred_volume.as_deref(), Some(r"^/mnt/disk\d+$"));
    assert!(!config.autostart);
    assert!(config.validate().is_ok());
}

#[test]
fn test_bad_values_keep_defaults() {
    let mut config = AppConfig::default();
    config.parse_ini("PORT=\"not-a-port\"\nVOLUME=\"\"\n");
    assert_eq!(config.port, AppConfig::default().port);
    assert!(config.volume.is_none(), "empty VOLUME should mean no explicit volume");
}

#[test]
fn test_empty_preferred_pattern_disables_preference() {
    let mut config = AppConfig::default();
    config.parse_ini("PREFERRED_VOLUME=\"\"");
    assert!(config.preferred_volume.is_none());
}

#[test]
fn test_default_config_validates() {
    let config = AppConfig::default();
    assert!(config.validate().is_ok());
    assert!(config.autostart);
}

#[test]
fn test_invalid_pattern_rejected() {
    let mut config = AppConfig::default();
    config.parse_ini("PREFERRED_VOLUME=\"^/mnt/(disk\"");
    assert!(config.validate().is_err());
}
