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

//! Catalog item types shared by search, facet counting, and output.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Products,
    Shops,
    Posts,
}

impl ItemKind {
    pub fn as_label(self) -> &'static str {
        match self {
            ItemKind::Products => "products",
            ItemKind::Shops => "shops",
            ItemKind::Posts => "posts",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_price: Option<String>,
    pub shop_id: String,
    pub shop_name: String,
    pub distance: String,
    pub rating: f64,
    pub review_count: u32,
    pub category: String,
    pub description: String,
    pub tags: Vec<String>,
    pub in_stock: bool,
    pub same_day: bool,
    pub free_delivery: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listed: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Shop {
    pub id: String,
    pub name: String,
    pub distance: String,
    pub rating: f64,
    pub review_count: u32,
    pub categories: Vec<String>,
    pub description: String,
    pub special_offer: bool,
    pub free_delivery: bool,
    pub verified: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Author {
    Shop { id: String, name: String },
    User { id: String, name: String },
}

impl Author {
    pub fn name(&self) -> &str {
        match self {
            Author::Shop { name, .. } | Author::User { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub comments: u32,
    #[serde(default)]
    pub shares: u32,
    #[serde(default)]
    pub time: String,
    pub author: Author,
}

/// Display columns for the plain-text result table.
pub trait Summary {
    fn id(&self) -> &str;
    fn title(&self) -> &str;
    fn detail(&self) -> String;
}

impl Summary for Product {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.name
    }

    fn detail(&self) -> String {
        format!("{} | {:.1} | {}", self.price, self.rating, self.shop_name)
    }
}

impl Summary for Shop {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.name
    }

    fn detail(&self) -> String {
        format!("{:.1} | {}", self.rating, self.distance)
    }
}

impl Summary for Post {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.content
    }

    fn detail(&self) -> String {
        format!(
            "{} | {} likes | {} comments",
            self.author.name(),
            self.likes,
            self.comments
        )
    }
}
