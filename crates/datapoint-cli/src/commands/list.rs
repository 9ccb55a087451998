//! List command
//!
//! Usage: datapoint list --owner <O> --name <N> [--between LO HI] [--limit N]

use clap::{ArgGroup, Args};
use datapoint_core::model::{RangeFilter, SortDirection};
use datapoint_engine::{apply_engine_query, EngineQuery, EngineQueryResult, ListRequest};

use super::GlobalArgs;

#[derive(Debug, Args)]
#[command(group(
    ArgGroup::new("filter")
        .args(["gt", "eq", "le", "lt", "ge", "begins_with", "between"])
        .multiple(false)
))]
pub struct ListArgs {
    #[arg(long)]
    pub owner: String,

    #[arg(long)]
    pub name: String,

    /// Sort key strictly greater than
    #[arg(long)]
    pub gt: Option<String>,

    #[arg(long)]
    pub eq: Option<String>,

    #[arg(long)]
    pub le: Option<String>,

    #[arg(long)]
    pub lt: Option<String>,

    #[arg(long)]
    pub ge: Option<String>,

    #[arg(long)]
    pub begins_with: Option<String>,

    /// Inclusive bounds, in the order given
    #[arg(long, num_args = 2, value_names = ["LOWER", "UPPER"])]
    pub between: Option<Vec<String>>,

    #[arg(long)]
    pub limit: Option<usize>,

    /// Token from a previous page's `nextToken`
    #[arg(long)]
    pub next_token: Option<String>,

    /// `ASC` scans forward; anything else scans backward
    #[arg(long, default_value = "ASC")]
    pub sort_direction: String,
}

impl ListArgs {
    fn filter(&self) -> Option<RangeFilter> {
        if let Some(v) = &self.gt {
            return Some(RangeFilter::GreaterThan(v.clone()));
        }
        if let Some(v) = &self.eq {
            return Some(RangeFilter::Equal(v.clone()));
        }
        if let Some(v) = &self.le {
            return Some(RangeFilter::LessOrEqual(v.clone()));
        }
        if let Some(v) = &self.lt {
            return Some(RangeFilter::LessThan(v.clone()));
        }
        if let Some(v) = &self.ge {
            return Some(RangeFilter::GreaterOrEqual(v.clone()));
        }
        if let Some(v) = &self.begins_with {
            return Some(RangeFilter::BeginsWith(v.clone()));
        }
        match self.between.as_deref() {
            Some([lower, upper]) => Some(RangeFilter::Between {
                lower: lower.clone(),
                upper: upper.clone(),
            }),
            _ => None,
        }
    }

    fn into_request(self) -> ListRequest {
        let mut request = ListRequest::new(self.owner.as_str(), self.name.as_str())
            .with_next_token(self.next_token.clone())
            .with_sort_direction(SortDirection::from_wire(&self.sort_direction));
        if let Some(filter) = self.filter() {
            request = request.with_filter(filter);
        }
        if let Some(limit) = self.limit {
            request = request.with_limit(limit);
        }
        request
    }
}

pub fn execute(args: ListArgs, global: &GlobalArgs) -> Result<(), Box<dyn std::error::Error>> {
    let engine = super::engine(global)?;
    let query = EngineQuery::ListDataPoints(args.into_request());

    match apply_engine_query(query, engine.query_service())? {
        EngineQueryResult::ListDataPoints(Some(response)) => {
            super::print_json(&serde_json::to_value(&response)?)
        }
        EngineQueryResult::ListDataPoints(None) => super::print_json(&serde_json::Value::Null),
    }
}
