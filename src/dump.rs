//! Flat JSON mirror of a layout result, for debugging sessions and golden
//! comparisons.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;

use crate::layout::LayoutResult;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub nodes: Vec<NodeDump>,
    pub routes: Vec<RouteDump>,
    pub unpositioned: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Serialize)]
pub struct RouteDump {
    pub edge: String,
    pub routing: String,
    pub points: Vec<[f64; 2]>,
}

impl LayoutDump {
    pub fn from_result(result: &LayoutResult) -> Self {
        let nodes = result
            .positions
            .iter()
            .map(|(id, position)| NodeDump {
                id: id.clone(),
                x: position.x,
                y: position.y,
            })
            .collect();

        let routes = result
            .routes
            .iter()
            .map(|(edge, route)| RouteDump {
                edge: edge.clone(),
                routing: format!("{:?}", route.routing),
                points: route.points.iter().map(|p| [p.x, p.y]).collect(),
            })
            .collect();

        LayoutDump {
            nodes,
            routes,
            unpositioned: result.unpositioned.clone(),
        }
    }

    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

pub fn write_layout_dump(path: &Path, result: &LayoutResult) -> std::io::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_result(result);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
