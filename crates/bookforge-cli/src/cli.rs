use clap::{Args, Parser, Subcommand, ValueEnum};

use bookforge_core::book::Visibility;
use bookforge_core::preferences::{FontFamily, Theme};

pub const DEFAULT_URL: &str = "http://127.0.0.1:3810";

#[derive(Debug, Parser)]
#[command(name = "bookforge", version, about = "Forge illustrated books from a story idea")]
pub struct Cli {
    /// bookforge-server base URL
    #[arg(long, global = true, env = "BOOKFORGE_SERVER_URL", default_value = DEFAULT_URL)]
    pub server: String,

    /// API key sent as a bearer token
    #[arg(long, global = true, env = "BOOKFORGE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Reader whose saved preferences apply to `read` and `prefs`
    #[arg(long, global = true, env = "BOOKFORGE_READER", default_value = "default")]
    pub reader: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Turn a story idea into a book with a cover
    Forge {
        /// The idea, in as many words as you like
        #[arg(required = true, num_args = 1..)]
        idea: Vec<String>,
        #[arg(long, default_value = "")]
        author: String,
        /// Share the book in the community gallery
        #[arg(long)]
        public: bool,
    },
    /// List your books, newest first
    Library {
        #[arg(long, value_enum)]
        visibility: Option<VisibilityArg>,
        #[arg(long)]
        author: Option<String>,
    },
    /// Browse public books
    Gallery {
        #[arg(long)]
        limit: Option<i64>,
        #[arg(long)]
        offset: Option<i64>,
    },
    /// Show a book's details
    Show { id: String },
    /// Print one page of a book
    Read {
        id: String,
        /// 1-based page number
        #[arg(long, default_value_t = 1)]
        page: i64,
        #[arg(long)]
        words_per_page: Option<u32>,
    },
    /// Save a book's cover image
    Cover {
        id: String,
        /// Output file; defaults to `<id>.<ext>`
        #[arg(long, short)]
        output: Option<String>,
    },
    /// Draw a new cover from the stored cover prompt
    RegenerateCover { id: String },
    /// Change title or author
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        author: Option<String>,
    },
    /// Share a book in the gallery
    Publish { id: String },
    /// Remove a book from the gallery
    Unpublish { id: String },
    /// Delete a book and its cover
    Delete { id: String },
    /// Reader display preferences
    Prefs {
        #[command(subcommand)]
        action: PrefsAction,
    },
    /// Check that the server is reachable
    Health,
}

#[derive(Debug, Subcommand)]
pub enum PrefsAction {
    Show,
    Set(PrefsSet),
}

#[derive(Debug, Args)]
pub struct PrefsSet {
    #[arg(long, value_enum)]
    pub theme: Option<ThemeArg>,
    #[arg(long, value_enum)]
    pub font: Option<FontArg>,
    #[arg(long)]
    pub font_size: Option<u32>,
    #[arg(long)]
    pub words_per_page: Option<u32>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum VisibilityArg {
    Private,
    Public,
}

impl From<VisibilityArg> for Visibility {
    fn from(v: VisibilityArg) -> Self {
        match v {
            VisibilityArg::Private => Visibility::Private,
            VisibilityArg::Public => Visibility::Public,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ThemeArg {
    Light,
    Sepia,
    Dark,
}

impl From<ThemeArg> for Theme {
    fn from(t: ThemeArg) -> Self {
        match t {
            ThemeArg::Light => Theme::Light,
            ThemeArg::Sepia => Theme::Sepia,
            ThemeArg::Dark => Theme::Dark,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FontArg {
    Serif,
    SansSerif,
    Monospace,
}

impl From<FontArg> for FontFamily {
    fn from(f: FontArg) -> Self {
        match f {
            FontArg::Serif => FontFamily::Serif,
            FontArg::SansSerif => FontFamily::SansSerif,
            FontArg::Monospace => FontFamily::Monospace,
        }
    }
}
