#[cfg(test)]
mod tests {
    use crate::cmd::export::ExportFormat;
    use crate::cmd::Commands;
    use crate::output::OutputMode;
    use crate::Opts;
    use clap::{CommandFactory, Parser};

    fn parse(args: &[&str]) -> Opts {
        let mut full = vec!["detectorctl"];
        full.extend_from_slice(args);
        Opts::parse_from(full)
    }

    #[test]
    fn parse_version() {
        let opts = parse(&["version"]);
        assert!(matches!(opts.cmd, Commands::Version));
    }

    #[test]
    fn parse_json_flag() {
        let opts = parse(&["--json", "list"]);
        assert!(opts.json);
        assert_eq!(opts.output_mode(), OutputMode::Json);
    }

    #[test]
    fn parse_human_flag_default() {
        let opts = parse(&["list"]);
        assert!(!opts.json);
        assert_eq!(opts.output_mode(), OutputMode::Human);
    }

    #[test]
    fn parse_config_flag_after_subcommand() {
        let opts = parse(&["validate", "--config", "/tmp/detectors.yaml"]);
        assert!(matches!(opts.cmd, Commands::Validate));
        assert_eq!(opts.config.as_deref(), Some("/tmp/detectors.yaml"));
    }

    #[test]
    fn parse_lint_and_path() {
        assert!(matches!(parse(&["lint"]).cmd, Commands::Lint));
        assert!(matches!(parse(&["path"]).cmd, Commands::Path));
    }

    #[test]
    fn parse_show() {
        match parse(&["show", "argo-cd"]).cmd {
            Commands::Show(args) => assert_eq!(args.name, "argo-cd"),
            _ => panic!("expected show"),
        }
    }

    #[test]
    fn parse_check_with_negative_value() {
        match parse(&["check", "argo-cd", "cpu", "-3.5", "--model-score", "1.2"]).cmd {
            Commands::Check(args) => {
                assert_eq!(args.detector, "argo-cd");
                assert_eq!(args.metric, "cpu");
                assert_eq!(args.value, -3.5);
                assert_eq!(args.model_score, Some(1.2));
            }
            _ => panic!("expected check"),
        }
    }

    #[test]
    fn parse_check_requires_value() {
        assert!(Opts::try_parse_from(["detectorctl", "check", "argo-cd", "cpu"]).is_err());
    }

    #[test]
    fn parse_replay() {
        let opts = parse(&["replay", "--samples", "samples.json"]);
        assert!(matches!(opts.cmd, Commands::Replay(_)));
    }

    #[test]
    fn export_format_follows_output_mode() {
        match parse(&["export"]).cmd {
            Commands::Export(args) => {
                assert_eq!(args.format(OutputMode::Human), ExportFormat::Yaml);
                assert_eq!(args.format(OutputMode::Json), ExportFormat::Json);
            }
            _ => panic!("expected export"),
        }
        match parse(&["export", "--format", "json"]).cmd {
            Commands::Export(args) => {
                assert_eq!(args.format(OutputMode::Human), ExportFormat::Json)
            }
            _ => panic!("expected export"),
        }
    }

    #[test]
    fn parse_watch_interval() {
        match parse(&["watch"]).cmd {
            Commands::Watch(args) => assert_eq!(args.interval, 5),
            _ => panic!("expected watch"),
        }
        match parse(&["watch", "--interval", "30"]).cmd {
            Commands::Watch(args) => assert_eq!(args.interval, 30),
            _ => panic!("expected watch"),
        }
    }

    #[test]
    fn every_subcommand_has_help() {
        let cmd = Opts::command();
        for sub in cmd.get_subcommands().filter(|s| s.get_name() != "help") {
            assert!(sub.get_about().is_some(), "{} has no help", sub.get_name());
        }
    }

    #[test]
    fn unknown_subcommand_rejected() {
        assert!(Opts::try_parse_from(["detectorctl", "register"]).is_err());
    }
}
