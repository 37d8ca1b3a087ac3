use super::*;

#[test]
fn no_command_means_interactive() {
    let cli = Cli::try_parse_from(["pi-remote"]).unwrap();
    assert!(cli.command.is_none());
    assert!(cli.server.is_none());
}

#[test]
fn global_flags_work_after_the_command() {
    let cli =
        Cli::try_parse_from(["pi-remote", "volume", "1.35", "--server", "http://pi:5001"]).unwrap();
    assert_eq!(cli.command, Some(Commands::Volume { value: 1.35 }));
    assert_eq!(cli.server.as_deref(), Some("http://pi:5001"));
}

#[test]
fn upload_needs_at_least_one_path() {
    assert!(Cli::try_parse_from(["pi-remote", "upload"]).is_err());

    let cli = Cli::try_parse_from(["pi-remote", "upload", "a.mp3", "music/"]).unwrap();
    assert_eq!(
        cli.command,
        Some(Commands::Upload {
            paths: vec![PathBuf::from("a.mp3"), PathBuf::from("music/")]
        })
    );
}

#[test]
fn play_rejects_negative_index() {
    assert!(Cli::try_parse_from(["pi-remote", "play", "-1"]).is_err());
    let cli = Cli::try_parse_from(["pi-remote", "play", "2"]).unwrap();
    assert_eq!(cli.command, Some(Commands::Play { index: 2 }));
}

#[test]
fn pause_help_mentions_starting_the_first_song() {
    use clap::CommandFactory;

    let cmd = Cli::command();
    let about = cmd
        .find_subcommand("pause")
        .and_then(|c| c.get_about())
        .map(|a| a.to_string())
        .unwrap();
    assert!(about.contains("first song"));
}
