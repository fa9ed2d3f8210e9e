//! Built-in schema of the IPL ball-by-ball CSV files

use crate::types::{FieldSpec, RecordSchema, SemanticType};

/// Schema of the input CSV files, one row per delivery
pub fn match_data() -> RecordSchema {
    use SemanticType as T;

    let fields = vec![
        FieldSpec::new("season", T::String, "The season in which the match is played represented by the year"),
        FieldSpec::new("match_id", T::String, "Unique identifier for the match."),
        FieldSpec::new("phase", T::String, "The phase of the tournament"),
        FieldSpec::new("match_no", T::Integer, "The match number in the tournament."),
        FieldSpec::new("date", T::String, "The date of the match"),
        FieldSpec::new("venue", T::String, "The venue where the match is held. Format: Stadium, City"),
        FieldSpec::new("batting_team", T::String, "The team that is batting."),
        FieldSpec::new("bowling_team", T::String, "The team that is bowling."),
        FieldSpec::new("innings", T::Integer, "The innings number (1 or 2)."),
        FieldSpec::new(
            "over",
            T::Float,
            r"The delivery/ball of the innings. In regex pattern ^(20(\.([0-5]))?|[1-9]?\d(\.([0-5]))?)$",
        ),
        FieldSpec::new("striker", T::String, "The player who is currently batting."),
        FieldSpec::new("bowler", T::String, "The player who is currently bowling."),
        FieldSpec::new("runs_of_bat", T::Integer, "The runs scored by the batsman in that delivery."),
        FieldSpec::new("extras", T::Integer, "The total number of extras in that delivery."),
        FieldSpec::new("wide", T::Integer, "The number of wide balls in that delivery."),
        FieldSpec::new("legbyes", T::Integer, "The number of leg-byes in that delivery."),
        FieldSpec::new("byes", T::Integer, "The number of byes in that delivery."),
        FieldSpec::new("noballs", T::Integer, "The number of no-balls in that delivery."),
        FieldSpec::new(
            "wicket_type",
            T::String,
            "The way the player was dismissed (e.g., bowled, caught), if applicable.",
        ),
        FieldSpec::new("player_dismissed", T::String, "The name of the player who got dismissed, if applicable."),
        FieldSpec::new("fielder", T::String, "The name of the fielder involved in the dismissal, if applicable."),
    ];

    RecordSchema {
        description: "IPL ball-by-ball match data".to_string(),
        fields,
    }
}
