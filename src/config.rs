use std::path::PathBuf;

use clap::Parser;

use crate::data::loader::{DataSource, BUILTIN_DATASET_URL};

#[derive(Parser, Debug, Clone)]
#[command(name = "titanic-explorer")]
#[command(about = "Interactive Titanic passenger data explorer")]
#[command(version)]
pub struct Config {
    /// CSV to fetch the dataset from.
    #[arg(long, env = "TITANIC_DATA_URL", default_value = BUILTIN_DATASET_URL)]
    pub data_url: String,

    /// Local CSV / JSON / Parquet copy; takes precedence over --data-url.
    #[arg(long, env = "TITANIC_DATA_FILE", value_name = "FILE")]
    pub data_file: Option<PathBuf>,

    /// Header image, skipped when the file does not exist.
    #[arg(long, value_name = "FILE", default_value = "titanic.png")]
    pub image: PathBuf,

    #[arg(long, default_value_t = 200.0)]
    pub image_width: f32,
}

impl Config {
    pub fn source(&self) -> DataSource {
        match &self.data_file {
            Some(path) => DataSource::File(path.clone()),
            None => DataSource::Remote {
                url: self.data_url.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_builtin_source() {
        let config = Config::try_parse_from(["titanic-explorer"]).unwrap();
        // Environment overrides would change this; only check when unset.
        if std::env::var_os("TITANIC_DATA_URL").is_none()
            && std::env::var_os("TITANIC_DATA_FILE").is_none()
        {
            assert_eq!(config.source(), DataSource::builtin());
        }
        assert_eq!(config.image_width, 200.0);
    }

    #[test]
    fn data_file_wins_over_url() {
        let config = Config::try_parse_from([
            "titanic-explorer",
            "--data-url",
            "http://example.invalid/t.csv",
            "--data-file",
            "local/titanic.parquet",
        ])
        .unwrap();
        assert_eq!(
            config.source(),
            DataSource::File(PathBuf::from("local/titanic.parquet"))
        );
    }
}
