pub struct DefaultsConfig {
    pub record_stem: String,
    pub job_name: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            record_stem: "conformers".to_string(),
            job_name: "conf".to_string(),
        }
    }
}
