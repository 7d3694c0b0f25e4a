use clap::Parser;
use std::net::SocketAddr;

use crate::words::{GameConfig, DEFAULT_WORD_CHOICES};

#[derive(Parser, Debug)]
#[command(
    name = "scribble_server",
    rename_all = "kebab-case",
    rename_all_env = "screaming-snake"
)]
pub struct Args {
    #[arg(default_value = "0.0.0.0:3000", env)]
    pub host: SocketAddr,

    /// Vocabulary the drawer's options are picked from
    #[arg(long, env = "GAME_WORDS", value_delimiter = ',')]
    pub words: Vec<String>,

    /// Number of words offered to the drawer
    #[arg(long, env, default_value_t = DEFAULT_WORD_CHOICES)]
    pub word_choices: usize,
}

impl Args {
    pub fn game_config(&self) -> GameConfig {
        GameConfig::new(self.words.clone(), self.word_choices)
    }
}
