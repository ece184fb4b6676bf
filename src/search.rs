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

use std::cmp::Ordering;
use std::fmt;
use std::time::Duration;
use std::time::Instant;

use anyhow::Result;
use serde::Serialize;
use tracing::debug;
use tracing::warn;

use crate::filter::Facet;
use crate::filter::FacetOption;
use crate::filter::FacetTarget;
use crate::filter::FilterSelection;
use crate::model::ItemKind;
use crate::model::Post;
use crate::model::Product;
use crate::model::Shop;
use crate::model::Summary;
use crate::numeric::parse_age;
use crate::numeric::parse_distance;
use crate::numeric::parse_price;
use crate::output::StatsOut;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Relevance,
    PriceAsc,
    PriceDesc,
    Rating,
    Distance,
    Newest,
    MostLiked,
    MostCommented,
}

impl SortKey {
    /// Accepts the labels shown in the sort sheet as well as slugs.
    pub fn parse(input: &str) -> Option<Self> {
        let key = match input.trim().to_lowercase().as_str() {
            "" | "relevance" => SortKey::Relevance,
            "price: low to high" | "price_asc" | "price-asc" => SortKey::PriceAsc,
            "price: high to low" | "price_desc" | "price-desc" => SortKey::PriceDesc,
            "rating" | "highest rated" | "top rated" | "customer rating" => SortKey::Rating,
            "distance" | "nearest" | "nearest first" => SortKey::Distance,
            "newest" | "newest first" | "recent" => SortKey::Newest,
            "most liked" | "most_liked" | "most-liked" => SortKey::MostLiked,
            "most commented" | "most_commented" | "most-commented" => SortKey::MostCommented,
            _ => return None,
        };
        Some(key)
    }

    pub fn parse_lenient(input: &str) -> Self {
        Self::parse(input).unwrap_or_default()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Relevance => "relevance",
            SortKey::PriceAsc => "price_asc",
            SortKey::PriceDesc => "price_desc",
            SortKey::Rating => "rating",
            SortKey::Distance => "distance",
            SortKey::Newest => "newest",
            SortKey::MostLiked => "most_liked",
            SortKey::MostCommented => "most_commented",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            SortKey::Relevance => "Relevance",
            SortKey::PriceAsc => "Price: Low to High",
            SortKey::PriceDesc => "Price: High to Low",
            SortKey::Rating => "Rating",
            SortKey::Distance => "Distance",
            SortKey::Newest => "Newest First",
            SortKey::MostLiked => "Most Liked",
            SortKey::MostCommented => "Most Commented",
        }
    }

    pub fn applies_to(self, kind: ItemKind) -> bool {
        match kind {
            ItemKind::Products => matches!(
                self,
                SortKey::Relevance
                    | SortKey::PriceAsc
                    | SortKey::PriceDesc
                    | SortKey::Rating
                    | SortKey::Distance
                    | SortKey::Newest
            ),
            ItemKind::Shops => matches!(
                self,
                SortKey::Relevance | SortKey::Rating | SortKey::Distance
            ),
            ItemKind::Posts => matches!(
                self,
                SortKey::Relevance
                    | SortKey::Newest
                    | SortKey::MostLiked
                    | SortKey::MostCommented
            ),
        }
    }

    fn descending(self) -> bool {
        matches!(
            self,
            SortKey::PriceDesc | SortKey::Rating | SortKey::MostLiked | SortKey::MostCommented
        )
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One item variant the engine can search. Search never compares items of
/// different variants.
pub trait Searchable: FacetTarget + Summary + Serialize {
    const KIND: ItemKind;

    /// Fields the free-text query is matched against.
    fn text_fields(&self) -> Vec<&str>;

    /// Numeric value behind a numeric sort key, `None` if absent or unparsable.
    fn sort_number(&self, key: SortKey) -> Option<f64>;

    fn age(&self) -> Option<Duration> {
        None
    }
}

impl Searchable for Product {
    const KIND: ItemKind = ItemKind::Products;

    fn text_fields(&self) -> Vec<&str> {
        let mut fields = vec![
            self.name.as_str(),
            self.description.as_str(),
            self.category.as_str(),
            self.shop_name.as_str(),
        ];
        fields.extend(self.tags.iter().map(String::as_str));
        fields
    }

    fn sort_number(&self, key: SortKey) -> Option<f64> {
        match key {
            SortKey::PriceAsc | SortKey::PriceDesc => parse_price(&self.price),
            SortKey::Rating => Some(self.rating),
            SortKey::Distance => parse_distance(&self.distance),
            _ => None,
        }
    }

    fn age(&self) -> Option<Duration> {
        self.listed.as_deref().and_then(parse_age)
    }
}

impl Searchable for Shop {
    const KIND: ItemKind = ItemKind::Shops;

    fn text_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.description.as_str()];
        fields.extend(self.categories.iter().map(String::as_str));
        fields
    }

    fn sort_number(&self, key: SortKey) -> Option<f64> {
        match key {
            SortKey::Rating => Some(self.rating),
            SortKey::Distance => parse_distance(&self.distance),
            _ => None,
        }
    }
}

impl Searchable for Post {
    const KIND: ItemKind = ItemKind::Posts;

    fn text_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.content.as_str(), self.author.name()];
        fields.extend(self.tags.iter().map(String::as_str));
        fields
    }

    fn sort_number(&self, key: SortKey) -> Option<f64> {
        match key {
            SortKey::MostLiked => Some(f64::from(self.likes)),
            SortKey::MostCommented => Some(f64::from(self.comments)),
            _ => None,
        }
    }

    fn age(&self) -> Option<Duration> {
        parse_age(&self.time)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SearchRequest<'q> {
    pub query: &'q str,
    pub filters: &'q FilterSelection,
    pub sort: SortKey,
}

#[derive(Debug)]
pub struct SearchOutcome<'a, T> {
    pub kind: ItemKind,
    pub items: Vec<&'a T>,
    pub sort: SortKey,
    pub stats: StatsOut,
}

impl<T: Searchable> SearchOutcome<'_, T> {
    pub fn to_json_results(&self) -> Result<Vec<serde_json::Value>> {
        let mut results = Vec::with_capacity(self.items.len());
        for item in &self.items {
            results.push(serde_json::to_value(item)?);
        }
        Ok(results)
    }
}

/// Text match, facet filter, and order `items` without touching the slice.
///
/// Identical arguments always yield the same items in the same order.
pub fn search<'a, T: Searchable>(
    items: &'a [T],
    query: &str,
    filters: &FilterSelection,
    sort: SortKey,
) -> Vec<&'a T> {
    let needle = normalize_query(query);
    let mut matched: Vec<&T> = items
        .iter()
        .filter(|item| matches_text(*item, needle.as_deref()))
        .filter(|item| filters.is_empty() || filters.matches(*item))
        .collect();
    apply_ordering(&mut matched, effective_sort::<T>(sort));
    matched
}

/// Runs [`search`] and records what the CLI reports alongside the items.
pub fn run_search<'a, T: Searchable>(
    items: &'a [T],
    request: SearchRequest<'_>,
) -> SearchOutcome<'a, T> {
    let started = Instant::now();
    let sort = effective_sort::<T>(request.sort);
    let matched = search(items, request.query, request.filters, sort);

    debug!(
        kind = %T::KIND,
        query = request.query,
        filters = %request.filters,
        sort = sort.as_str(),
        scanned = items.len(),
        matched = matched.len(),
        "search complete"
    );

    let stats = StatsOut {
        took_ms: started.elapsed().as_millis() as i64,
        total_hits: matched.len() as i64,
        scanned: Some(items.len() as i64),
        ..Default::default()
    };

    SearchOutcome {
        kind: T::KIND,
        items: matched,
        sort,
        stats,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacetCount {
    pub facet: Facet,
    pub label: String,
    pub count: usize,
    pub selected: bool,
}

/// Count, for every standard option of every facet, the items that match the
/// query, the other facets' selections, and that option.
pub fn facet_counts<T: Searchable>(
    items: &[T],
    query: &str,
    filters: &FilterSelection,
) -> Vec<FacetCount> {
    let needle = normalize_query(query);
    let text_matched: Vec<&T> = items
        .iter()
        .filter(|item| matches_text(*item, needle.as_deref()))
        .collect();

    let mut counts = Vec::new();
    for facet in Facet::ALL {
        let mut others = filters.clone();
        others.clear(facet);
        let base: Vec<&T> = text_matched
            .iter()
            .copied()
            .filter(|item| others.matches(*item))
            .collect();

        for label in facet.standard_options() {
            let Some(option) = FacetOption::parse(label) else {
                continue;
            };
            let count = base.iter().filter(|item| item.satisfies(&option)).count();
            let selected = filters
                .selected(facet)
                .iter()
                .any(|s| s.label.eq_ignore_ascii_case(label));
            counts.push(FacetCount {
                facet,
                label: label.to_string(),
                count,
                selected,
            });
        }
    }
    counts
}

pub fn print_table<T: Searchable>(outcome: &SearchOutcome<'_, T>) {
    print!("{}", render_table(&outcome.items));
}

fn render_table<T: Summary>(items: &[&T]) -> String {
    let mut out = String::new();
    for item in items {
        out.push_str(&format!("{}\t{}\t{}\n", item.id(), item.title(), item.detail()));
    }
    out
}

fn normalize_query(query: &str) -> Option<String> {
    let trimmed = query.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
}

fn matches_text<T: Searchable>(item: &T, needle: Option<&str>) -> bool {
    let Some(needle) = needle else {
        return true;
    };
    item.text_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

fn effective_sort<T: Searchable>(sort: SortKey) -> SortKey {
    if sort.applies_to(T::KIND) {
        sort
    } else {
        warn!(
            kind = %T::KIND,
            sort = sort.as_str(),
            "sort key does not apply; keeping relevance order"
        );
        SortKey::Relevance
    }
}

fn apply_ordering<T: Searchable>(items: &mut [&T], sort: SortKey) {
    match sort {
        SortKey::Relevance => {}
        SortKey::Newest => order_by_age(items),
        _ => {
            let descending = sort.descending();
            items.sort_by(|a, b| {
                let ord = numeric_cmp(a.sort_number(sort), b.sort_number(sort));
                if descending { ord.reverse() } else { ord }
            });
        }
    }
}

// Unparsable values rank lowest.
fn numeric_cmp(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

// Youngest first; undated items follow in reverse input order.
fn order_by_age<T: Searchable>(items: &mut [&T]) {
    let mut keyed: Vec<(usize, Option<Duration>, &T)> = items
        .iter()
        .enumerate()
        .map(|(idx, item)| (idx, item.age(), *item))
        .collect();
    keyed.sort_by(|a, b| match (a.1, b.1) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.0.cmp(&a.0),
    });
    for (slot, (_, _, item)) in items.iter_mut().zip(keyed) {
        *slot = item;
    }
}
