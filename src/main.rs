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

mod catalog;
mod cli;
mod config;
mod filter;
mod model;
mod numeric;
mod output;
mod scroll;
mod search;

use std::path::Path;
use std::path::PathBuf;

use anyhow::Context as _;
use anyhow::Result;
use clap::CommandFactory;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::catalog::Catalog;
use crate::cli::Cli;
use crate::cli::Commands;
use crate::cli::FacetsArgs;
use crate::cli::ScrollArgs;
use crate::cli::SearchArgs;
use crate::config::Config;
use crate::config::ConfigCtx;
use crate::filter::FilterSelection;
use crate::model::ItemKind;
use crate::output::JsonResponse;
use crate::output::StatsOut;
use crate::output::print_json;
use crate::search::FacetCount;
use crate::search::SearchRequest;
use crate::search::Searchable;
use crate::search::SortKey;

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("SHOPLENS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Search(args) => {
            let json = args.json;
            handle_result(cmd_search(config_path, args), json)
        }
        Commands::Facets(args) => {
            let json = args.json;
            handle_result(cmd_facets(args), json)
        }
        Commands::Scroll(args) => {
            let json = args.json;
            handle_result(cmd_scroll(config_path, args), json)
        }
        Commands::Init { path } => cmd_init(path),
        Commands::Config => cmd_config(config_path),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "shoplens", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn handle_result(result: Result<()>, json: bool) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(err) => {
            if json {
                let resp = JsonResponse::error("error", &format!("{err:#}"));
                print_json(&resp)?;
                Ok(())
            } else {
                Err(err)
            }
        }
    }
}

fn load_catalog(path: &Path) -> Result<(Catalog, Vec<String>)> {
    let catalog = Catalog::load(path)?;
    let warnings = catalog.validate();
    debug!(
        products = catalog.products.len(),
        shops = catalog.shops.len(),
        posts = catalog.posts.len(),
        warnings = warnings.len(),
        "catalog loaded"
    );
    Ok((catalog, warnings))
}

fn resolve_sort(requested: Option<&str>, config: &Config, warnings: &mut Vec<String>) -> SortKey {
    match requested {
        Some(label) => SortKey::parse(label).unwrap_or_else(|| {
            warnings.push(format!("unknown sort {label:?}; using relevance"));
            SortKey::Relevance
        }),
        None => config.default_sort(),
    }
}

fn cmd_search(config_path: Option<&Path>, args: SearchArgs) -> Result<()> {
    let ctx = ConfigCtx::load(config_path)?;
    let (catalog, mut warnings) = load_catalog(&args.catalog)?;
    let filters = FilterSelection::from_args(args.filter.as_slice())?;
    let sort = resolve_sort(args.sort.as_deref(), &ctx.config, &mut warnings);

    let view = SearchView {
        query: &args.query,
        filters: &filters,
        sort,
        with_facets: args.facets,
        json: args.json,
    };
    match args.kind {
        ItemKind::Products => view.emit(&catalog.products, warnings),
        ItemKind::Shops => view.emit(&catalog.shops, warnings),
        ItemKind::Posts => view.emit(&catalog.posts, warnings),
    }
}

struct SearchView<'a> {
    query: &'a str,
    filters: &'a FilterSelection,
    sort: SortKey,
    with_facets: bool,
    json: bool,
}

impl SearchView<'_> {
    fn emit<T: Searchable>(&self, items: &[T], mut warnings: Vec<String>) -> Result<()> {
        let outcome = search::run_search(
            items,
            SearchRequest {
                query: self.query,
                filters: self.filters,
                sort: self.sort,
            },
        );
        if outcome.sort != self.sort {
            warnings.push(format!(
                "sort {:?} does not apply to {}; using relevance",
                self.sort.display_name(),
                outcome.kind
            ));
        }
        let facets = self
            .with_facets
            .then(|| search::facet_counts(items, self.query, self.filters));

        if self.json {
            let mut resp = JsonResponse::ok()
                .with_query(
                    self.query,
                    outcome.kind.as_label(),
                    self.filters.labels(),
                    outcome.sort.as_str(),
                )
                .with_results(outcome.to_json_results()?)
                .with_stats(outcome.stats.clone())
                .with_warnings(warnings);
            if let Some(facets) = facets {
                resp = resp.with_facets(facets);
            }
            print_json(&resp)?;
        } else {
            search::print_table(&outcome);
            if let Some(facets) = facets {
                println!();
                print_facets(&facets);
            }
            for warn in warnings {
                eprintln!("warning: {warn}");
            }
        }
        Ok(())
    }
}

fn print_facets(facets: &[FacetCount]) {
    for count in facets {
        let mark = if count.selected { "*" } else { " " };
        println!("{mark} {}\t{}\t{}", count.facet, count.label, count.count);
    }
}

fn cmd_facets(args: FacetsArgs) -> Result<()> {
    let (catalog, warnings) = load_catalog(&args.catalog)?;
    let mut filters = FilterSelection::from_args(args.filter.as_slice())?;
    for arg in &args.toggle {
        filters.toggle_arg(arg)?;
    }
    let counts = match args.kind {
        ItemKind::Products => search::facet_counts(&catalog.products, &args.query, &filters),
        ItemKind::Shops => search::facet_counts(&catalog.shops, &args.query, &filters),
        ItemKind::Posts => search::facet_counts(&catalog.posts, &args.query, &filters),
    };

    if args.json {
        let resp = JsonResponse::ok()
            .with_query(
                &args.query,
                args.kind.as_label(),
                filters.labels(),
                SortKey::Relevance.as_str(),
            )
            .with_facets(counts)
            .with_warnings(warnings);
        print_json(&resp)?;
    } else {
        print_facets(&counts);
        for warn in warnings {
            eprintln!("warning: {warn}");
        }
    }
    Ok(())
}

fn cmd_scroll(config_path: Option<&Path>, args: ScrollArgs) -> Result<()> {
    let ctx = ConfigCtx::load(config_path)?;
    let text = std::fs::read_to_string(&args.trace)
        .with_context(|| format!("read trace {}", args.trace.display()))?;
    let samples = scroll::parse_trace(&text)?;
    let config = ctx.config.scroll_config(args.bar);
    let replay = scroll::replay(config, &samples, args.settle);

    if args.json {
        let resp = JsonResponse::ok()
            .with_transitions(&replay.transitions, replay.final_visibility)
            .with_stats(StatsOut {
                took_ms: 0,
                total_hits: replay.transitions.len() as i64,
                scroll: Some(replay.stats),
                ..Default::default()
            });
        print_json(&resp)?;
    } else {
        for t in &replay.transitions {
            println!(
                "{}\t{}\t{:?} -> {:?}\t{:?}",
                t.at.as_millis(),
                t.offset,
                t.from,
                t.to,
                t.cause
            );
        }
        println!(
            "Final: {:?} ({:.2}) at {} ms ({} samples, {} ignored)",
            replay.final_visibility,
            replay.final_progress,
            replay.end.as_millis(),
            replay.stats.samples,
            replay.stats.ignored
        );
    }
    Ok(())
}

fn cmd_init(path: Option<PathBuf>) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => config::global_config_path()
            .ok_or_else(|| anyhow::anyhow!("config dir unavailable; pass a path"))?,
    };
    if path.exists() {
        anyhow::bail!("config already exists at {}", path.display());
    }
    config::write_config(&path, &Config::default())?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

fn cmd_config(config_path: Option<&Path>) -> Result<()> {
    let ctx = ConfigCtx::load(config_path)?;
    match &ctx.path {
        Some(path) => println!("# source: {}", path.display()),
        None => println!("# source: built-in defaults"),
    }
    let text = toml::to_string_pretty(&ctx.config).context("serialize config")?;
    print!("{text}");
    Ok(())
}
