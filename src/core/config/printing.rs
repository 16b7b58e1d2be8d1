use crate::core::config::data::Config;

impl Config {
    pub fn print_all(&self) {
        println!("Current configuration:");
        println!("  model: {}", self.model());
        println!("  base-url: {}", self.base_url());
        println!("  api-version: {}", self.api_version());
        match self.request_timeout_secs {
            Some(secs) => println!("  request-timeout: {secs}s"),
            None => println!("  request-timeout: (unset)"),
        }
        match self.markdown_enabled() {
            true => println!("  markdown: on"),
            false => println!("  markdown: off"),
        }
        println!("  credential-groups: {}", self.credential_groups().join(", "));
        // Entry values are key fragments; only the count is shown.
        println!("  credential-table: {} entries", self.credential_table.len());
    }
}
