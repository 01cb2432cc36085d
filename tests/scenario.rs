//! Integration tests for the scenario document pipeline
//!
//! These tests exercise the complete path from a JSON request to a
//! simulated trajectory.

use approx::assert_relative_eq;
use pksol::prelude::*;
use pksol::ConfigurationError;

// ═══════════════════════════════════════════════════════════════════════════════
// Parsing Tests
// ═══════════════════════════════════════════════════════════════════════════════

mod parsing {
    use super::*;

    #[test]
    fn test_parse_complete_scenario() {
        let json = r#"{
            "model": {
                "kind": "tmdd",
                "num_compartments": 2,
                "route": {"transit_oral": {"num_transit": 3}}
            },
            "parameters": {
                "CL": 1.0, "V1": 8.0, "Q": 2.0, "V2": 5.0, "MTT": 6.0,
                "KINT": 0.1, "KON": 0.5, "KOFF": 0.05, "KSYN": 1.0, "KDEG": 0.2
            },
            "regimen": {"dose": 50.0, "num_doses": 3, "interval": 12.0},
            "options": {"horizon": 72.0, "reporting_step": 0.5, "step_size": null}
        }"#;

        let scenario = Scenario::from_json(json).expect("should parse");
        assert_eq!(scenario.model.kind, ModelKind::Tmdd);
        assert_eq!(scenario.model.num_compartments, 2);
        assert_eq!(scenario.model.route.num_transit(), 3);
        assert_eq!(scenario.parameters.len(), 10);
        assert_eq!(scenario.regimen.num_doses, 3);
        assert_eq!(scenario.options.horizon, 72.0);
    }

    #[test]
    fn test_omitted_options_fall_back_to_defaults() {
        let json = r#"{
            "model": {"kind": "standard", "num_compartments": 1, "route": "iv_bolus"},
            "parameters": {"CL": 1.0, "V": 10.0},
            "regimen": {"dose": 100.0, "num_doses": 1, "interval": 0.0}
        }"#;

        let scenario = Scenario::from_json(json).expect("should parse");
        assert_eq!(scenario.options, SimulationOptions::default());
        assert_eq!(scenario.options.horizon, 48.0);
    }

    #[test]
    fn test_parameter_names_are_case_insensitive() {
        let json = r#"{
            "model": {"kind": "standard", "num_compartments": 1, "route": "iv_bolus"},
            "parameters": {"cl": 1.0, "v": 10.0},
            "regimen": {"dose": 100.0, "num_doses": 1, "interval": 0.0}
        }"#;

        let scenario = Scenario::from_json(json).expect("should parse");
        assert_eq!(scenario.parameters.get("CL"), Some(1.0));
        assert!(scenario.simulate().is_ok());
    }

    #[test]
    fn test_reject_malformed_document() {
        let result = Scenario::from_json(r#"{"model": "one_compartment"}"#);
        assert!(matches!(result, Err(PksolError::Parse(_))));
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Round-Trip Tests
// ═══════════════════════════════════════════════════════════════════════════════

mod round_trip {
    use super::*;

    #[test]
    fn test_scenario_survives_json_round_trip() {
        let scenario = Scenario::new(
            ModelConfig::standard(2, Route::FirstOrderOral),
            Parameters::default()
                .with("CL", 1.5)
                .with("V1", 12.0)
                .with("Q", 3.0)
                .with("V2", 7.0)
                .with("KA", 0.8),
            DosingRegimen::new(200.0, 4, 8.0),
        );

        let json = scenario.to_json().expect("serialize");
        let back = Scenario::from_json(&json).expect("parse");
        assert_eq!(back, scenario);
    }

    #[test]
    fn test_round_trip_preserves_simulation_output() {
        let scenario = Scenario::new(
            ModelConfig::standard(1, Route::IvBolus),
            Parameters::default().with("CL", 1.0).with("V", 10.0),
            DosingRegimen::single(100.0),
        );

        let json = scenario.to_json().expect("serialize");
        let back = Scenario::from_json(&json).expect("parse");

        let original = scenario.simulate().expect("original run");
        let reparsed = back.simulate().expect("reparsed run");
        assert_eq!(original, reparsed);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// End-to-End Tests
// ═══════════════════════════════════════════════════════════════════════════════

mod end_to_end {
    use super::*;

    #[test]
    fn test_json_request_to_trajectory() {
        let json = r#"{
            "model": {"kind": "standard", "num_compartments": 1, "route": "iv_bolus"},
            "parameters": {"CL": 1.0, "V": 10.0},
            "regimen": {"dose": 100.0, "num_doses": 1, "interval": 0.0},
            "options": {"horizon": 24.0, "reporting_step": 1.0}
        }"#;

        let trajectory = Scenario::from_json(json)
            .expect("parse")
            .simulate()
            .expect("simulate");

        assert_eq!(trajectory.len(), 25);
        assert_relative_eq!(trajectory.samples()[0].concentration, 10.0);
        assert!(trajectory.cmax().expect("cmax") >= trajectory.samples().last().unwrap().concentration);
    }

    #[test]
    fn test_required_parameters_drive_a_valid_request() {
        // Fill every advertised name and nothing else; the build must succeed
        let config = ModelConfig::tmdd(3, Route::TransitOral { num_transit: 2 });
        let mut parameters = Parameters::default();
        for name in required_parameters(&config) {
            parameters.insert(name, 1.0);
        }

        let scenario = Scenario::new(config, parameters, DosingRegimen::single(10.0));
        assert!(scenario.simulate().is_ok());
    }

    #[test]
    fn test_trajectory_exports_csv() {
        let scenario = Scenario::new(
            ModelConfig::standard(1, Route::IvBolus),
            Parameters::default().with("CL", 1.0).with("V", 10.0),
            DosingRegimen::single(100.0),
        );

        let trajectory = scenario.simulate().expect("simulate");
        let mut buffer = Vec::new();
        trajectory.write_csv(&mut buffer).expect("csv export");

        let text = String::from_utf8(buffer).expect("utf8");
        assert!(text.starts_with("time,concentration\n"));
        assert_eq!(text.lines().count(), trajectory.len() + 1);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Error Surface Tests
// ═══════════════════════════════════════════════════════════════════════════════

mod errors {
    use super::*;

    #[test]
    fn test_missing_parameter_names_the_field() {
        let scenario = Scenario::new(
            ModelConfig::standard(2, Route::IvBolus),
            Parameters::default().with("CL", 1.0).with("V1", 10.0),
            DosingRegimen::single(100.0),
        );

        let err = scenario.simulate().unwrap_err();
        match err {
            PksolError::Configuration(ConfigurationError::MissingParameter { name }) => {
                assert_eq!(name, "Q");
            }
            other => panic!("expected missing parameter, got {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_compartment_count_is_rejected() {
        let scenario = Scenario::new(
            ModelConfig::standard(4, Route::IvBolus),
            Parameters::default().with("CL", 1.0).with("V1", 10.0),
            DosingRegimen::single(100.0),
        );

        let err = scenario.simulate().unwrap_err();
        assert!(matches!(
            err,
            PksolError::Configuration(ConfigurationError::UnsupportedCompartments { count: 4 })
        ));
    }

    #[test]
    fn test_negative_dose_is_rejected() {
        let scenario = Scenario::new(
            ModelConfig::standard(1, Route::IvBolus),
            Parameters::default().with("CL", 1.0).with("V", 10.0),
            DosingRegimen::single(-5.0),
        );

        let err = scenario.simulate().unwrap_err();
        assert!(matches!(
            err,
            PksolError::Configuration(ConfigurationError::InvalidDose { .. })
        ));
    }

    #[test]
    fn test_error_messages_surface_verbatim() {
        let err = PksolError::from(ConfigurationError::missing_parameter("KA"));
        assert_eq!(
            err.to_string(),
            "Invalid configuration: Missing required parameter 'KA'"
        );
    }
}
