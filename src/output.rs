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

use std::collections::BTreeMap;

use anyhow::Result;
use serde::Serialize;
use serde_json::Value;

use crate::filter::Facet;
use crate::scroll::Cause;
use crate::scroll::ScrollStats;
use crate::scroll::Transition;
use crate::scroll::Visibility;
use crate::search::FacetCount;

#[derive(Debug, Clone, Serialize, Default)]
pub struct StatsOut {
    pub took_ms: i64,
    pub total_hits: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scanned: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scroll: Option<ScrollStats>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryOut {
    pub text: String,
    pub kind: String,
    pub filters: BTreeMap<Facet, Vec<String>>,
    pub sort: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransitionOut {
    pub t_ms: u64,
    pub offset: f64,
    pub from: Visibility,
    pub to: Visibility,
    pub cause: Cause,
}

impl From<&Transition> for TransitionOut {
    fn from(t: &Transition) -> Self {
        Self {
            t_ms: t.at.as_millis() as u64,
            offset: t.offset,
            from: t.from,
            to: t.to,
            cause: t.cause,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorOut {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct JsonResponse {
    pub ok: bool,
    pub schema_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<QueryOut>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facets: Option<Vec<FacetCount>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transitions: Option<Vec<TransitionOut>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<StatsOut>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorOut>,
}

impl JsonResponse {
    pub fn ok() -> Self {
        Self {
            ok: true,
            schema_version: "1".to_string(),
            ..Default::default()
        }
    }

    pub fn error(code: &str, message: &str) -> Self {
        Self {
            ok: false,
            schema_version: "1".to_string(),
            error: Some(ErrorOut {
                code: code.to_string(),
                message: message.to_string(),
            }),
            ..Default::default()
        }
    }

    pub fn with_query(
        mut self,
        text: &str,
        kind: &str,
        filters: BTreeMap<Facet, Vec<String>>,
        sort: &str,
    ) -> Self {
        self.query = Some(QueryOut {
            text: text.to_string(),
            kind: kind.to_string(),
            filters,
            sort: sort.to_string(),
        });
        self
    }

    pub fn with_results(mut self, results: Vec<Value>) -> Self {
        self.results = Some(results);
        self
    }

    pub fn with_facets(mut self, facets: Vec<FacetCount>) -> Self {
        self.facets = Some(facets);
        self
    }

    pub fn with_transitions(mut self, transitions: &[Transition], visibility: Visibility) -> Self {
        self.transitions = Some(transitions.iter().map(TransitionOut::from).collect());
        self.visibility = Some(visibility);
        self
    }

    pub fn with_stats(mut self, stats: StatsOut) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }
}

pub fn print_json(resp: &JsonResponse) -> Result<()> {
    let text = serde_json::to_string_pretty(resp)?;
    println!("{text}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_envelope_omits_empty_sections() {
        let value = serde_json::to_value(JsonResponse::error("error", "boom")).expect("json");
        insta::assert_json_snapshot!(value, @r#"
        {
          "error": {
            "code": "error",
            "message": "boom"
          },
          "ok": false,
          "schema_version": "1"
        }
        "#);
    }
}
