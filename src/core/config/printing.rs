use crate::core::config::data::{path_display, Config};

impl Config {
    pub fn print_all(&self) {
        println!("Current configuration:");
        match &self.default_model {
            Some(model) => println!("  default-model: {model}"),
            None => println!("  default-model: (unset)"),
        }
        match self.default_temperature {
            Some(temperature) => println!("  default-temperature: {temperature}"),
            None => println!("  default-temperature: (unset)"),
        }
        match &self.default_persona {
            Some(persona) => println!("  default-persona: {persona}"),
            None => println!("  default-persona: (unset)"),
        }
        match &self.base_url {
            Some(url) => println!("  base-url: {url}"),
            None => println!("  base-url: (unset)"),
        }
        if self.models.is_empty() {
            println!("  models: (none added)");
        } else {
            println!("  models:");
            for model in &self.models {
                println!("    {model}");
            }
        }
        match &self.export_dir {
            Some(dir) => println!("  export-dir: {}", path_display(dir)),
            None => println!("  export-dir: (current directory)"),
        }
    }
}
