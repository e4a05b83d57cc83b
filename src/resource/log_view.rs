//! The `signalfx_log_view` resource.
//!
//! A log view is a chart of type `LogsChart`: a SignalFlow `logs()` program
//! rendered as a table, with optional column and sort configuration. State
//! carries time bounds in seconds while the chart API speaks milliseconds;
//! the payload shaping here converts in both directions.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::client::{
    Chart, ChartColumn, ChartOptions, ChartRequest, ChartSortOption, ChartTime, LOGS_CHART_TYPE,
};
use crate::error::ProviderError;
use crate::meta::Meta;
use crate::resource::Resource;
use crate::schema::{Attribute, Block, Diagnostic, NestedBlock, Schema};

/// Type name of the log view resource.
pub const LOG_VIEW_TYPE: &str = "signalfx_log_view";

const MILLIS_PER_SECOND: i64 = 1000;

/// State of a log view as the host stores it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogViewState {
    /// Server-assigned chart id, empty until created.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Display name.
    pub name: String,
    /// SignalFlow program, e.g. `logs().publish()`.
    pub program_text: String,
    /// Free-form description.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Rolling window in seconds before now. Conflicts with the absolute
    /// bounds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_range: Option<i64>,
    /// Absolute window start, Unix seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
    /// Absolute window end, Unix seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
    /// Table columns in display order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<LogViewColumn>,
    /// Sort applied to the table.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sort_options: Vec<LogViewSortOption>,
    /// Log observer connection the view queries.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub default_connection: String,
    /// Deep link into the web application, computed.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,
}

/// One column of a log view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogViewColumn {
    /// Log field the column displays.
    pub name: String,
}

/// Sort configuration of a log view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogViewSortOption {
    /// Sort descending instead of ascending.
    pub descending: bool,
    /// Log field to sort by.
    pub field: String,
}

impl LogViewState {
    /// Decode a chart API response, converting milliseconds to seconds.
    /// The computed `url` is filled in by the caller, which has the meta.
    fn from_chart(chart: &Chart) -> Self {
        let mut state = Self {
            id: chart.id.clone(),
            name: chart.name.clone(),
            program_text: chart.program_text.clone(),
            description: chart.description.clone(),
            ..Self::default()
        };
        if let Some(options) = &chart.options {
            state.default_connection = options.default_connection.clone();
            state.columns = options
                .columns
                .iter()
                .map(|column| LogViewColumn {
                    name: column.name.clone(),
                })
                .collect();
            state.sort_options = options
                .sort_options
                .iter()
                .map(|sort| LogViewSortOption {
                    descending: sort.descending,
                    field: sort.field.clone(),
                })
                .collect();
            if let Some(time) = &options.time {
                match time.time_type.as_str() {
                    "relative" => {
                        state.time_range = time.range.map(|millis| millis / MILLIS_PER_SECOND);
                    },
                    "absolute" => {
                        state.start_time = time.start.map(|millis| millis / MILLIS_PER_SECOND);
                        state.end_time = time.end.map(|millis| millis / MILLIS_PER_SECOND);
                    },
                    _ => {},
                }
            }
        }
        state
    }
}

/// Build the chart API payload for a log view state, converting seconds to
/// milliseconds (clamped at the i64 bounds). A relative window wins over
/// absolute bounds; an end time without a start time is ignored.
fn chart_request(state: &LogViewState) -> ChartRequest {
    let time = if let Some(range) = state.time_range {
        Some(ChartTime::relative(range.saturating_mul(MILLIS_PER_SECOND)))
    } else {
        match (state.start_time, state.end_time) {
            (Some(start), Some(end)) => Some(ChartTime::absolute(
                start.saturating_mul(MILLIS_PER_SECOND),
                end.saturating_mul(MILLIS_PER_SECOND),
            )),
            (Some(start), None) => Some(ChartTime {
                time_type: "absolute".to_string(),
                start: Some(start.saturating_mul(MILLIS_PER_SECOND)),
                ..ChartTime::default()
            }),
            _ => None,
        }
    };

    ChartRequest {
        name: state.name.clone(),
        description: state.description.clone(),
        program_text: state.program_text.clone(),
        options: Some(ChartOptions {
            chart_type: LOGS_CHART_TYPE.to_string(),
            default_connection: state.default_connection.clone(),
            columns: state
                .columns
                .iter()
                .map(|column| ChartColumn {
                    name: column.name.clone(),
                })
                .collect(),
            sort_options: state
                .sort_options
                .iter()
                .map(|sort| ChartSortOption {
                    descending: sort.descending,
                    field: sort.field.clone(),
                })
                .collect(),
            time,
        }),
    }
}

fn state_with_url(chart: &Chart, meta: &Meta) -> LogViewState {
    let mut state = LogViewState::from_chart(chart);
    state.url = meta.load_application_url(&["chart", &state.id]);
    state
}

/// The log view resource implementation.
#[derive(Debug)]
pub struct LogViewResource;

#[async_trait]
impl Resource for LogViewResource {
    fn type_name(&self) -> &'static str {
        LOG_VIEW_TYPE
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_attribute(
                "id",
                Attribute::computed_string().with_description("Identifier of the log view"),
            )
            .with_attribute(
                "name",
                Attribute::required_string().with_description("Name of the log view"),
            )
            .with_attribute(
                "program_text",
                Attribute::required_string().with_description(
                    "Signalflow program text for the log view. \
                     More info at https://dev.splunk.com/observability/docs/signalflow",
                ),
            )
            .with_attribute(
                "description",
                Attribute::optional_string().with_description("Description of the log view"),
            )
            .with_attribute(
                "time_range",
                Attribute::optional_int64().with_description(
                    "Seconds to display in the visualization. \
                     This is a rolling range from the current time. \
                     Example: 3600 corresponds to -1h in web UI. \
                     Conflicts with start_time and end_time",
                ),
            )
            .with_attribute(
                "start_time",
                Attribute::optional_int64()
                    .with_description("Seconds since epoch to start the visualization"),
            )
            .with_attribute(
                "end_time",
                Attribute::optional_int64()
                    .with_description("Seconds since epoch to end the visualization"),
            )
            .with_attribute(
                "default_connection",
                Attribute::optional_string()
                    .with_description("Default connection that the log view uses"),
            )
            .with_attribute(
                "url",
                Attribute::computed_string().with_description("URL of the log view"),
            )
            .with_block(
                "columns",
                NestedBlock::list(
                    Block::new()
                        .with_attribute(
                            "name",
                            Attribute::required_string().with_description("Name of the column"),
                        )
                        .with_description("Column configuration"),
                ),
            )
            .with_block(
                "sort_options",
                NestedBlock::list(
                    Block::new()
                        .with_attribute(
                            "field",
                            Attribute::required_string()
                                .with_description("Name of the field to sort by"),
                        )
                        .with_attribute(
                            "descending",
                            Attribute::required_bool()
                                .with_description("Designates if this is descending or ascending"),
                        )
                        .with_description("Sorting options configuration"),
                ),
            )
    }

    fn validate_config(&self, config: &Value) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        let has_range = config
            .get("time_range")
            .map_or(false, |value| !value.is_null());
        let has_bounds = config
            .get("start_time")
            .map_or(false, |value| !value.is_null())
            || config
                .get("end_time")
                .map_or(false, |value| !value.is_null());
        if has_range && has_bounds {
            diagnostics.push(
                Diagnostic::error("time_range conflicts with start_time and end_time")
                    .with_detail("Use either a rolling time_range or absolute start_time/end_time")
                    .with_attribute("time_range"),
            );
        }
        diagnostics
    }

    async fn create(&self, meta: &Meta, planned_state: Value) -> Result<Value, ProviderError> {
        let state: LogViewState = serde_json::from_value(planned_state)?;
        let client = meta.client()?;
        let chart = client.create_chart(&chart_request(&state)).await?;
        let created = state_with_url(&chart, meta);
        info!(id = %created.id, name = %created.name, "created log view");
        Ok(serde_json::to_value(created)?)
    }

    async fn read(&self, meta: &Meta, current_state: Value) -> Result<Value, ProviderError> {
        let state: LogViewState = serde_json::from_value(current_state)?;
        if state.id.is_empty() {
            return Err(ProviderError::Validation(
                "log view state has no id".to_string(),
            ));
        }
        let client = meta.client()?;
        let chart = match client.get_chart(&state.id).await {
            Ok(chart) => chart,
            Err(err) if err.is_not_found() => {
                warn!(id = %state.id, "log view no longer exists, dropping from state");
                return Ok(Value::Null);
            },
            Err(err) => return Err(err),
        };
        Ok(serde_json::to_value(state_with_url(&chart, meta))?)
    }

    async fn update(
        &self,
        meta: &Meta,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        let prior: LogViewState = serde_json::from_value(prior_state)?;
        let mut planned: LogViewState = serde_json::from_value(planned_state)?;
        if planned.id.is_empty() {
            planned.id = prior.id;
        }
        if planned.id.is_empty() {
            return Err(ProviderError::Validation(
                "log view state has no id".to_string(),
            ));
        }
        let client = meta.client()?;
        let chart = client
            .update_chart(&planned.id, &chart_request(&planned))
            .await?;
        let updated = state_with_url(&chart, meta);
        info!(id = %updated.id, "updated log view");
        Ok(serde_json::to_value(updated)?)
    }

    async fn delete(&self, meta: &Meta, current_state: Value) -> Result<(), ProviderError> {
        let state: LogViewState = serde_json::from_value(current_state)?;
        if state.id.is_empty() {
            return Err(ProviderError::Validation(
                "log view state has no id".to_string(),
            ));
        }
        let client = meta.client()?;
        client.delete_chart(&state.id).await?;
        info!(id = %state.id, "deleted log view");
        Ok(())
    }

    async fn import(&self, meta: &Meta, id: &str) -> Result<Value, ProviderError> {
        let client = meta.client()?;
        let chart = client.get_chart(id).await?;
        let imported = state_with_url(&chart, meta);
        info!(id = %id, "imported log view");
        Ok(serde_json::to_value(imported)?)
    }
}
