use super::settings::AppConfig;

impl AppConfig {
    /// Parse the simple KEY="VALUE" config format. Unknown keys and bad values are ignored.
    pub(crate) fn parse_ini(&mut self, contents: &str) {
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                let value = value.trim().trim_matches('"');

                match key {
                    "PORT" => {
                        if let Ok(v) = value.parse() {
                            self.port = v;
                        }
                    }
                    "MOUNT_TABLE" => {
                        self.mount_table = value.to_string();
                    }
                    "VOLUMES" => {
                        self.volumes = split_list(value);
                    }
                    "VOLUME" => {
                        self.volume = Some(value.to_string()).filter(|v| !v.is_empty());
                    }
                    "PREFERRED_VOLUME" => {
                        // An empty pattern disables the preference.
                        self.preferred_volume = Some(value.to_string()).filter(|v| !v.is_empty());
                    }
                    "AUTOSTART" => {
                        self.autostart = parse_flag(value);
                    }
                    _ => {} // Ignore unknown keys
                }
            }
        }
    }
}

pub(super) fn split_list(value: &str) -> Vec<String> {
    value.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect()
}

fn parse_flag(value: &str) -> bool {
    value == "yes" || value == "true" || value == "1"
}
