//! Graph-to-workbook export
//!
//! [`compile`] turns the live layout into the five tables of the
//! configuration workbook. It is a pure function of its inputs: rows follow
//! node and edge order, so the same input always yields the same output.
//!
//! Every node gets a Stations row whatever its kind; sources and drains
//! carry their kind-derived class type. Edges are routed by endpoint kind:
//!
//! | source kind | target kind | rows                     |
//! |-------------|-------------|--------------------------|
//! | Source      | any         | Mat_Inflow               |
//! | Station     | Drain       | Mat_Outflow + Flow       |
//! | Station     | Station     | Flow                     |
//! | otherwise   |             | none                     |
//!
//! Edges whose endpoints cannot be resolved are skipped.

use std::collections::HashMap;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::config::defaults;
use crate::error::{LayoutEngineError, Result};
use crate::types::{GraphEdge, GraphNode, NodeKind};
use crate::workers::WorkerRecord;

/// Sheet names in workbook order
pub const SHEET_NAMES: [&str; 5] = ["Stations", "Flow", "Workers", "Mat_Inflow", "Mat_Outflow"];

/// How node positions map to the X_Pos / Y_Pos columns
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CoordinateMode {
    /// Canvas coordinates as they are
    Raw,
    /// Position divided by a grid unit per axis, rounded half up
    Grid { x_unit: f64, y_unit: f64 },
}

impl Default for CoordinateMode {
    fn default() -> Self {
        CoordinateMode::Grid {
            x_unit: defaults::GRID_X_UNIT,
            y_unit: defaults::GRID_Y_UNIT,
        }
    }
}

impl CoordinateMode {
    fn map(&self, x: f64, y: f64) -> (f64, f64) {
        match *self {
            CoordinateMode::Raw => (x, y),
            CoordinateMode::Grid { x_unit, y_unit } => {
                (round_half_up(x / x_unit), round_half_up(y / y_unit))
            }
        }
    }
}

fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Export settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub coordinates: CoordinateMode,
}

impl ExportOptions {
    /// Options exporting raw canvas coordinates
    pub fn raw() -> Self {
        Self {
            coordinates: CoordinateMode::Raw,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let CoordinateMode::Grid { x_unit, y_unit } = self.coordinates {
            let valid = |unit: f64| unit.is_finite() && unit > 0.0;
            if !valid(x_unit) || !valid(y_unit) {
                return Err(LayoutEngineError::config(
                    "export grid units must be finite and positive",
                ));
            }
        }
        Ok(())
    }
}

/// A row type with a fixed column order
pub trait SheetRow {
    /// Column headers, in sheet order
    const COLUMNS: &'static [&'static str];

    /// Cell values, one per column
    fn cells(&self) -> Vec<Value>;
}

/// Row of the Stations sheet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationRow {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "ClassType")]
    pub class_type: String,
    #[serde(rename = "X_Pos", serialize_with = "serialize_number")]
    pub x_pos: f64,
    #[serde(rename = "Y_Pos", serialize_with = "serialize_number")]
    pub y_pos: f64,
    #[serde(rename = "ProcTime")]
    pub proc_time: String,
    #[serde(rename = "WorkerPool")]
    pub worker_pool: String,
}

impl SheetRow for StationRow {
    const COLUMNS: &'static [&'static str] =
        &["Name", "ClassType", "X_Pos", "Y_Pos", "ProcTime", "WorkerPool"];

    fn cells(&self) -> Vec<Value> {
        vec![
            Value::from(self.name.as_str()),
            Value::from(self.class_type.as_str()),
            number_cell(self.x_pos),
            number_cell(self.y_pos),
            Value::from(self.proc_time.as_str()),
            Value::from(self.worker_pool.as_str()),
        ]
    }
}

/// Row of the Flow sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowRow {
    #[serde(rename = "Predecessor")]
    pub predecessor: String,
    #[serde(rename = "Successor")]
    pub successor: String,
}

impl SheetRow for FlowRow {
    const COLUMNS: &'static [&'static str] = &["Predecessor", "Successor"];

    fn cells(&self) -> Vec<Value> {
        vec![
            Value::from(self.predecessor.as_str()),
            Value::from(self.successor.as_str()),
        ]
    }
}

/// Row of the Mat_Inflow sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatInflowRow {
    #[serde(rename = "SourceName")]
    pub source_name: String,
    #[serde(rename = "Successor")]
    pub successor: String,
    #[serde(rename = "MU_Type")]
    pub mu_type: String,
    #[serde(rename = "Amount")]
    pub amount: i64,
}

impl SheetRow for MatInflowRow {
    const COLUMNS: &'static [&'static str] = &["SourceName", "Successor", "MU_Type", "Amount"];

    fn cells(&self) -> Vec<Value> {
        vec![
            Value::from(self.source_name.as_str()),
            Value::from(self.successor.as_str()),
            Value::from(self.mu_type.as_str()),
            Value::from(self.amount),
        ]
    }
}

/// Row of the Mat_Outflow sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatOutflowRow {
    #[serde(rename = "Predecessor")]
    pub predecessor: String,
    #[serde(rename = "DrainName")]
    pub drain_name: String,
}

impl SheetRow for MatOutflowRow {
    const COLUMNS: &'static [&'static str] = &["Predecessor", "DrainName"];

    fn cells(&self) -> Vec<Value> {
        vec![
            Value::from(self.predecessor.as_str()),
            Value::from(self.drain_name.as_str()),
        ]
    }
}

/// One table, ready for a sheet writer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sheet {
    pub name: &'static str,
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<Value>>,
}

impl Sheet {
    fn from_rows<R: SheetRow>(name: &'static str, rows: &[R]) -> Self {
        Self {
            name,
            columns: R::COLUMNS.to_vec(),
            rows: rows.iter().map(SheetRow::cells).collect(),
        }
    }
}

/// The compiled workbook
///
/// Serializes as a JSON object keyed by sheet name, in workbook order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Workbook {
    #[serde(rename = "Stations")]
    pub stations: Vec<StationRow>,
    #[serde(rename = "Flow")]
    pub flows: Vec<FlowRow>,
    #[serde(rename = "Workers")]
    pub workers: Vec<WorkerRecord>,
    #[serde(rename = "Mat_Inflow")]
    pub mat_inflow: Vec<MatInflowRow>,
    #[serde(rename = "Mat_Outflow")]
    pub mat_outflow: Vec<MatOutflowRow>,
}

impl Workbook {
    /// All five tables in workbook order
    pub fn sheets(&self) -> Vec<Sheet> {
        vec![
            Sheet::from_rows(SHEET_NAMES[0], &self.stations),
            Sheet::from_rows(SHEET_NAMES[1], &self.flows),
            Sheet::from_rows(SHEET_NAMES[2], &self.workers),
            Sheet::from_rows(SHEET_NAMES[3], &self.mat_inflow),
            Sheet::from_rows(SHEET_NAMES[4], &self.mat_outflow),
        ]
    }

    /// Total number of rows across all tables
    pub fn row_count(&self) -> usize {
        self.stations.len()
            + self.flows.len()
            + self.workers.len()
            + self.mat_inflow.len()
            + self.mat_outflow.len()
    }
}

/// Compile a layout into workbook tables
pub fn compile(
    nodes: &[GraphNode],
    edges: &[GraphEdge],
    workers: &[WorkerRecord],
    options: &ExportOptions,
) -> Workbook {
    let by_id: HashMap<&str, &GraphNode> = nodes.iter().map(|n| (n.id.as_str(), n)).collect();

    let mut workbook = Workbook {
        stations: nodes.iter().map(|n| station_row(n, options)).collect(),
        workers: workers.to_vec(),
        ..Default::default()
    };

    let mut skipped = 0usize;
    for edge in edges {
        let (Some(source), Some(target)) = (
            by_id.get(edge.source.as_str()),
            by_id.get(edge.target.as_str()),
        ) else {
            skipped += 1;
            continue;
        };
        route_edge(source, target, &mut workbook);
    }

    if skipped > 0 {
        log::debug!("Skipped {} edge(s) with unresolved endpoints", skipped);
    }
    log::info!(
        "Compiled workbook: {} stations, {} flows, {} workers, {} inflows, {} outflows",
        workbook.stations.len(),
        workbook.flows.len(),
        workbook.workers.len(),
        workbook.mat_inflow.len(),
        workbook.mat_outflow.len()
    );
    workbook
}

fn station_row(node: &GraphNode, options: &ExportOptions) -> StationRow {
    let attrs = node.attributes();
    let (x_pos, y_pos) = options.coordinates.map(node.position.x, node.position.y);
    StationRow {
        name: node.export_name(),
        class_type: attrs.class_type_or_default(node.kind),
        x_pos,
        y_pos,
        proc_time: attrs.proc_time_or_default().to_string(),
        worker_pool: attrs.worker_pool_or_default().to_string(),
    }
}

fn route_edge(source: &GraphNode, target: &GraphNode, workbook: &mut Workbook) {
    let predecessor = source.export_name();
    let successor = target.export_name();

    match (source.kind, target.kind) {
        (NodeKind::Source, _) => {
            let attrs = source.attributes();
            workbook.mat_inflow.push(MatInflowRow {
                source_name: predecessor,
                successor,
                mu_type: attrs.mu_type_or_default().to_string(),
                amount: attrs.amount_or_default(),
            });
        }
        (_, NodeKind::Drain) => {
            workbook.mat_outflow.push(MatOutflowRow {
                predecessor: predecessor.clone(),
                drain_name: successor.clone(),
            });
            workbook.flows.push(FlowRow {
                predecessor,
                successor,
            });
        }
        (NodeKind::Station, NodeKind::Station) => {
            workbook.flows.push(FlowRow {
                predecessor,
                successor,
            });
        }
        _ => {}
    }
}

// Integral values are written as integers so grid positions read `4`, not `4.0`.
fn number_cell(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
        Value::from(value as i64)
    } else {
        Value::from(value)
    }
}

fn serialize_number<S: Serializer>(
    value: &f64,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    number_cell(*value).serialize(serializer)
}
