// Copyright 2026 Shoplens Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::PathBuf;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;

use crate::config::Bar;
use crate::model::ItemKind;

#[derive(Parser, Debug)]
#[command(
    name = "shoplens",
    version,
    about = "Search, filter, and scroll-visibility engine for a shopping feed"
)]
pub struct Cli {
    /// Config file (defaults to the global shoplens.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search a catalog snapshot
    Search(SearchArgs),

    /// Count matches per filter option
    Facets(FacetsArgs),

    /// Replay a scroll trace through the visibility controller
    Scroll(ScrollArgs),

    /// Write the default config file
    Init {
        /// Destination (defaults to the global config path)
        path: Option<PathBuf>,
    },

    /// Print the effective config
    Config,

    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Query text (empty matches everything)
    #[arg(default_value = "")]
    pub query: String,

    /// Catalog JSON file
    #[arg(long)]
    pub catalog: PathBuf,

    /// Item variant to search
    #[arg(long, value_enum, default_value_t = ItemKind::Products)]
    pub kind: ItemKind,

    /// Facet filter, e.g. "rating=4+ Stars|3+ Stars" (repeatable)
    #[arg(long)]
    pub filter: Vec<String>,

    /// Sort key label or slug, e.g. "Price: Low to High"
    #[arg(long)]
    pub sort: Option<String>,

    /// Include per-option facet counts
    #[arg(long)]
    pub facets: bool,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct FacetsArgs {
    /// Query text
    #[arg(default_value = "")]
    pub query: String,

    /// Catalog JSON file
    #[arg(long)]
    pub catalog: PathBuf,

    /// Item variant to count
    #[arg(long, value_enum, default_value_t = ItemKind::Products)]
    pub kind: ItemKind,

    /// Facet filter (repeatable)
    #[arg(long)]
    pub filter: Vec<String>,

    /// Tap a filter chip on top of --filter: selects the option if absent,
    /// deselects it if present (repeatable)
    #[arg(long)]
    pub toggle: Vec<String>,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ScrollArgs {
    /// JSONL trace of {"t_ms", "offset"} samples
    pub trace: PathBuf,

    /// Which docked bar's timings to use
    #[arg(long, value_enum, default_value_t = Bar::BottomBar)]
    pub bar: Bar,

    /// Advance the clock one idle timeout past the last sample
    #[arg(long)]
    pub settle: bool,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}
