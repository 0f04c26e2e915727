use std::{
    fs,
    io::{self, Read},
    path::Path,
};

use crate::{Error, Point, Result, tour::MIN_CYCLE_NODES};

const NODE_COORD_SECTION_HEADER: &str = "NODE_COORD_SECTION";
const EOF_MARKER: &str = "EOF";
const TSPLIB_NODE_ID_BASE: usize = 1;

/// Planar TSPLIB instance: node `i` sits at `points[i]`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Problem {
    pub name: Option<String>,
    pub edge_weight_type: Option<String>,
    pub points: Vec<Point>,
}

impl Problem {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Reads a TSPLIB file, or stdin when `path` is `None`.
pub fn read_problem(path: Option<&Path>) -> Result<Problem> {
    let text = match path {
        Some(path) => fs::read_to_string(path).map_err(|e| {
            Error::invalid_input(format!("failed to read {}: {e}", path.display()))
        })?,
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            text
        }
    };
    parse_problem(&text)
}

/// Parses the `NODE_COORD_SECTION` of a TSPLIB problem, converting 1-based ids to 0-based.
pub fn parse_problem(text: &str) -> Result<Problem> {
    let mut problem = Problem::default();
    let mut dimension: Option<usize> = None;
    let mut coords: Vec<Option<Point>> = Vec::new();
    let mut in_coord_section = false;
    let line_count = text.lines().count();

    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case(EOF_MARKER) {
            break;
        }

        if !in_coord_section {
            if line.eq_ignore_ascii_case(NODE_COORD_SECTION_HEADER) {
                in_coord_section = true;
                continue;
            }
            let Some((key, value)) = line
                .split_once(':')
                .map(|(key, value)| (key.trim().to_ascii_uppercase(), value.trim()))
            else {
                continue;
            };
            match key.as_str() {
                "NAME" => problem.name = Some(value.to_string()),
                "EDGE_WEIGHT_TYPE" => problem.edge_weight_type = Some(value.to_string()),
                "DIMENSION" => {
                    let parsed = value.parse::<usize>().map_err(|e| {
                        Error::invalid_data(format!("Bad DIMENSION value '{value}': {e}"))
                    })?;
                    // Each node needs its own coordinate line.
                    if parsed > line_count {
                        return Err(Error::invalid_data(format!(
                            "Line {line_no}: DIMENSION {parsed} exceeds the {line_count} lines of input"
                        )));
                    }
                    dimension = Some(parsed);
                    coords = vec![None; parsed];
                }
                _ => {}
            }
            continue;
        }

        let mut tokens = line.split_whitespace();
        let (Some(id), Some(x), Some(y)) = (tokens.next(), tokens.next(), tokens.next()) else {
            return Err(Error::invalid_data(format!(
                "Line {line_no}: expected '<id> <x> <y>', got '{line}'"
            )));
        };
        let id: usize = id
            .parse()
            .map_err(|e| Error::invalid_data(format!("Line {line_no}: bad node id '{id}': {e}")))?;
        let point = Point::new(parse_coord(x, line_no)?, parse_coord(y, line_no)?);
        if !point.is_finite() {
            return Err(Error::invalid_data(format!(
                "Line {line_no}: node {id} has a coordinate that is not finite"
            )));
        }

        let Some(dimension) = dimension else {
            return Err(Error::invalid_data(
                "NODE_COORD_SECTION appears before DIMENSION",
            ));
        };
        if id < TSPLIB_NODE_ID_BASE || id > dimension {
            return Err(Error::invalid_data(format!(
                "Line {line_no}: node id {id} is outside 1..={dimension}"
            )));
        }
        let slot = &mut coords[id - TSPLIB_NODE_ID_BASE];
        if slot.replace(point).is_some() {
            return Err(Error::invalid_data(format!(
                "Line {line_no}: duplicate node id {id}"
            )));
        }
    }

    if !in_coord_section {
        return Err(Error::invalid_data("Missing NODE_COORD_SECTION"));
    }
    if let Some(missing) = coords.iter().position(Option::is_none) {
        return Err(Error::invalid_data(format!(
            "DIMENSION is {}, but node id {} has no coordinates",
            coords.len(),
            missing + TSPLIB_NODE_ID_BASE
        )));
    }
    problem.points = coords.into_iter().flatten().collect();
    if problem.points.len() < MIN_CYCLE_NODES {
        return Err(Error::invalid_data(format!(
            "Problem has {} nodes; need at least {MIN_CYCLE_NODES}",
            problem.points.len()
        )));
    }

    log::debug!(
        "problem.parse: name={} nodes={}",
        problem.name.as_deref().unwrap_or("-"),
        problem.points.len()
    );
    Ok(problem)
}

fn parse_coord(token: &str, line_no: usize) -> Result<f64> {
    token
        .parse()
        .map_err(|e| Error::invalid_data(format!("Line {line_no}: bad coordinate '{token}': {e}")))
}
