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

use std::collections::HashSet;
use std::path::Path;

use anyhow::Context;
use anyhow::Result;
use serde::Deserialize;
use serde::Serialize;

use crate::model::Post;
use crate::model::Product;
use crate::model::Shop;
use crate::numeric::parse_distance;
use crate::numeric::parse_price;

/// Immutable snapshot of everything the app can search over.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub products: Vec<Product>,
    pub shops: Vec<Shop>,
    pub posts: Vec<Post>,
}

impl Catalog {
    pub fn load(path: &Path) -> Result<Self> {
        let text =
            std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parse catalog {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let catalog = serde_json::from_str(text)?;
        Ok(catalog)
    }

    /// Data quality problems that do not prevent searching.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        duplicate_ids("product", self.products.iter().map(|p| p.id.as_str()), &mut warnings);
        duplicate_ids("shop", self.shops.iter().map(|s| s.id.as_str()), &mut warnings);
        duplicate_ids("post", self.posts.iter().map(|p| p.id.as_str()), &mut warnings);

        for product in &self.products {
            if parse_price(&product.price).is_none() {
                warnings.push(format!(
                    "product {}: unparsable price {:?}",
                    product.id, product.price
                ));
            }
            if parse_distance(&product.distance).is_none() {
                warnings.push(format!(
                    "product {}: unparsable distance {:?}",
                    product.id, product.distance
                ));
            }
            check_rating("product", &product.id, product.rating, &mut warnings);
        }
        for shop in &self.shops {
            if parse_distance(&shop.distance).is_none() {
                warnings.push(format!(
                    "shop {}: unparsable distance {:?}",
                    shop.id, shop.distance
                ));
            }
            check_rating("shop", &shop.id, shop.rating, &mut warnings);
        }

        warnings
    }
}

fn duplicate_ids<'a>(
    label: &str,
    ids: impl Iterator<Item = &'a str>,
    warnings: &mut Vec<String>,
) {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            warnings.push(format!("duplicate {label} id {id:?}"));
        }
    }
}

fn check_rating(label: &str, id: &str, rating: f64, warnings: &mut Vec<String>) {
    if !(0.0..=5.0).contains(&rating) {
        warnings.push(format!("{label} {id}: rating {rating} outside 0-5"));
    }
}
