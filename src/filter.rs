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

//! Facet filters: named categories of option labels, each label mapping to
//! a deterministic predicate. Options OR within a facet, facets AND together.

use std::collections::BTreeMap;
use std::fmt;

use anyhow::Result;
use serde::Serialize;

use crate::model::Post;
use crate::model::Product;
use crate::model::Shop;
use crate::numeric::parse_price;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Facet {
    Price,
    Rating,
    Availability,
    Delivery,
}

impl Facet {
    pub const ALL: [Facet; 4] = [
        Facet::Price,
        Facet::Rating,
        Facet::Availability,
        Facet::Delivery,
    ];

    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "price" => Ok(Facet::Price),
            "rating" => Ok(Facet::Rating),
            "availability" => Ok(Facet::Availability),
            "delivery" => Ok(Facet::Delivery),
            other => anyhow::bail!(
                "unknown facet {other:?}; expected price, rating, availability, or delivery"
            ),
        }
    }

    pub fn as_label(self) -> &'static str {
        match self {
            Facet::Price => "price",
            Facet::Rating => "rating",
            Facet::Availability => "availability",
            Facet::Delivery => "delivery",
        }
    }

    /// Option labels offered on the filter sheet for this facet.
    pub fn standard_options(self) -> &'static [&'static str] {
        match self {
            Facet::Price => &["Under ₹200", "₹200 - ₹500", "Above ₹500"],
            Facet::Rating => &["4.5+ Stars", "4+ Stars", "3+ Stars"],
            Facet::Availability => &["In Stock", "Verified", "Special Offer"],
            Facet::Delivery => &["Same Day Delivery", "Free Delivery"],
        }
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FacetOption {
    PriceBelow(f64),
    PriceBetween(f64, f64),
    PriceAbove(f64),
    MinRating(f64),
    InStock,
    Verified,
    SpecialOffer,
    SameDay,
    FreeDelivery,
}

impl FacetOption {
    /// Maps a filter-sheet label such as `Under ₹200` or `4+ Stars` to its
    /// predicate. Labels are case-insensitive.
    pub fn parse(label: &str) -> Option<Self> {
        let lower = label.trim().to_lowercase();
        match lower.as_str() {
            "in stock" => return Some(FacetOption::InStock),
            "verified" | "verified shops" => return Some(FacetOption::Verified),
            "special offer" | "special offers" => return Some(FacetOption::SpecialOffer),
            "same day" | "same day delivery" | "same-day delivery" => {
                return Some(FacetOption::SameDay);
            }
            "free delivery" => return Some(FacetOption::FreeDelivery),
            _ => {}
        }

        if let Some(rest) = lower
            .strip_prefix("under ")
            .or_else(|| lower.strip_prefix("below "))
        {
            return parse_price(rest).map(FacetOption::PriceBelow);
        }
        if let Some(rest) = lower
            .strip_prefix("above ")
            .or_else(|| lower.strip_prefix("over "))
        {
            return parse_price(rest).map(FacetOption::PriceAbove);
        }
        if lower.contains("star") || lower.ends_with('+') {
            return parse_min_rating(&lower).map(FacetOption::MinRating);
        }
        if let Some((lo, hi)) = lower.split_once('-') {
            let lo = parse_price(lo)?;
            let hi = parse_price(hi)?;
            return (lo <= hi).then_some(FacetOption::PriceBetween(lo, hi));
        }
        None
    }

    pub fn facet(&self) -> Facet {
        match self {
            FacetOption::PriceBelow(_)
            | FacetOption::PriceBetween(_, _)
            | FacetOption::PriceAbove(_) => Facet::Price,
            FacetOption::MinRating(_) => Facet::Rating,
            FacetOption::InStock | FacetOption::Verified | FacetOption::SpecialOffer => {
                Facet::Availability
            }
            FacetOption::SameDay | FacetOption::FreeDelivery => Facet::Delivery,
        }
    }
}

fn parse_min_rating(lower: &str) -> Option<f64> {
    let text = lower.strip_suffix("& up").unwrap_or(lower).trim();
    let text = text
        .strip_suffix("stars")
        .or_else(|| text.strip_suffix("star"))
        .unwrap_or(text)
        .trim();
    let text = text.strip_suffix('+').unwrap_or(text).trim();
    let value: f64 = text.parse().ok()?;
    (0.0..=5.0).contains(&value).then_some(value)
}

/// Implemented by every item variant a facet can be applied to.
///
/// Options that do not describe the variant (a price bound on a shop, any
/// option on a post) are unsatisfied.
pub trait FacetTarget {
    fn satisfies(&self, option: &FacetOption) -> bool;
}

impl FacetTarget for Product {
    fn satisfies(&self, option: &FacetOption) -> bool {
        let price = || parse_price(&self.price);
        match *option {
            FacetOption::PriceBelow(max) => price().is_some_and(|p| p < max),
            FacetOption::PriceBetween(lo, hi) => price().is_some_and(|p| p >= lo && p <= hi),
            FacetOption::PriceAbove(min) => price().is_some_and(|p| p > min),
            FacetOption::MinRating(min) => self.rating >= min,
            FacetOption::InStock => self.in_stock,
            FacetOption::SameDay => self.same_day,
            FacetOption::FreeDelivery => self.free_delivery,
            FacetOption::Verified | FacetOption::SpecialOffer => false,
        }
    }
}

impl FacetTarget for Shop {
    fn satisfies(&self, option: &FacetOption) -> bool {
        match *option {
            FacetOption::MinRating(min) => self.rating >= min,
            FacetOption::Verified => self.verified,
            FacetOption::SpecialOffer => self.special_offer,
            FacetOption::FreeDelivery => self.free_delivery,
            _ => false,
        }
    }
}

impl FacetTarget for Post {
    fn satisfies(&self, _option: &FacetOption) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selected {
    pub label: String,
    pub option: FacetOption,
}

/// Selected option labels per facet. An absent or empty facet places no
/// constraint on the result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSelection {
    facets: BTreeMap<Facet, Vec<Selected>>,
}

impl FilterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses repeated `facet=label|label` arguments into one selection.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Self> {
        let mut selection = Self::new();
        for arg in args {
            selection.parse_arg(arg.as_ref())?;
        }
        Ok(selection)
    }

    pub fn parse_arg(&mut self, arg: &str) -> Result<()> {
        let Some((facet, labels)) = arg.split_once('=') else {
            anyhow::bail!("filter {arg:?} must look like facet=option|option");
        };
        let facet = Facet::parse(facet)?;
        for label in labels.split('|').map(str::trim).filter(|l| !l.is_empty()) {
            self.insert(facet, label)?;
        }
        Ok(())
    }

    /// Toggles each `|`-separated label of a `facet=label|label` argument.
    pub fn toggle_arg(&mut self, arg: &str) -> Result<()> {
        let Some((facet, labels)) = arg.split_once('=') else {
            anyhow::bail!("toggle {arg:?} must look like facet=option|option");
        };
        let facet = Facet::parse(facet)?;
        for label in labels.split('|').map(str::trim).filter(|l| !l.is_empty()) {
            self.toggle(facet, label)?;
        }
        Ok(())
    }

    /// Adds `label` under `facet`; returns false if it was already selected.
    pub fn insert(&mut self, facet: Facet, label: &str) -> Result<bool> {
        let Some(option) = FacetOption::parse(label) else {
            anyhow::bail!("unknown {facet} option {label:?}");
        };
        if option.facet() != facet {
            anyhow::bail!("option {label:?} belongs to {} not {facet}", option.facet());
        }
        let selected = self.facets.entry(facet).or_default();
        if selected.iter().any(|s| s.label.eq_ignore_ascii_case(label.trim())) {
            return Ok(false);
        }
        selected.push(Selected {
            label: label.trim().to_string(),
            option,
        });
        Ok(true)
    }

    pub fn remove(&mut self, facet: Facet, label: &str) -> bool {
        let Some(selected) = self.facets.get_mut(&facet) else {
            return false;
        };
        let before = selected.len();
        selected.retain(|s| !s.label.eq_ignore_ascii_case(label.trim()));
        let removed = selected.len() != before;
        if selected.is_empty() {
            self.facets.remove(&facet);
        }
        removed
    }

    /// Chip-style toggle: selects the label if absent, deselects it if present.
    pub fn toggle(&mut self, facet: Facet, label: &str) -> Result<bool> {
        if self.remove(facet, label) {
            return Ok(false);
        }
        self.insert(facet, label)
    }

    pub fn clear(&mut self, facet: Facet) {
        self.facets.remove(&facet);
    }

    pub fn is_empty(&self) -> bool {
        self.facets.values().all(Vec::is_empty)
    }

    pub fn selected(&self, facet: Facet) -> &[Selected] {
        self.facets.get(&facet).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn matches<T: FacetTarget>(&self, item: &T) -> bool {
        self.facets
            .values()
            .filter(|selected| !selected.is_empty())
            .all(|selected| selected.iter().any(|s| item.satisfies(&s.option)))
    }

    pub fn labels(&self) -> BTreeMap<Facet, Vec<String>> {
        self.facets
            .iter()
            .filter(|(_, selected)| !selected.is_empty())
            .map(|(facet, selected)| {
                let labels = selected.iter().map(|s| s.label.clone()).collect::<Vec<_>>();
                (*facet, labels)
            })
            .collect()
    }
}

impl fmt::Display for FilterSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .labels()
            .into_iter()
            .map(|(facet, labels)| format!("{facet}={}", labels.join("|")))
            .collect();
        f.write_str(&parts.join("; "))
    }
}
