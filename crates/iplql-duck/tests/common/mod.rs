//! Shared fixtures for store tests

#![allow(dead_code)]

use iplql_schema::{FieldSpec, RecordSchema, SemanticType};
use std::path::Path;

pub fn write_csv(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).expect("write csv fixture");
}

/// Two-column schema matching the `deliveries.csv` fixture
pub fn two_column_schema() -> RecordSchema {
    RecordSchema::new(
        "IPL ball-by-ball match data",
        vec![
            FieldSpec::new("batting_team", SemanticType::String, "The team that is batting."),
            FieldSpec::new(
                "runs_of_bat",
                SemanticType::Integer,
                "The runs scored by the batsman in that delivery.",
            ),
        ],
    )
    .expect("fixture schema is valid")
}

pub const DELIVERIES: &str = "batting_team,runs_of_bat\nMI,4\nCSK,1\nRCB,6\nMI,0\n";

/// Two deliveries in the layout of the published IPL ball-by-ball files
pub const MATCH_DATA: &str = "\
season,match_id,phase,match_no,date,venue,batting_team,bowling_team,innings,over,striker,bowler,runs_of_bat,extras,wide,legbyes,byes,noballs,wicket_type,player_dismissed,fielder
2025,1473438,Group Stage,1,2025-03-22,\"Eden Gardens, Kolkata\",KKR,RCB,1,0.1,Quinton de Kock,Josh Hazlewood,0,1,1,0,0,0,,,
2025,1473438,Group Stage,1,2025-03-22,\"Eden Gardens, Kolkata\",KKR,RCB,1,0.2,Quinton de Kock,Josh Hazlewood,0,0,0,0,0,0,caught,Quinton de Kock,Jitesh Sharma
";
