mod args;
mod commands;
mod dispatch;
mod run;

use dispatch::RunParams;

/// Color output mode for the diagnostic printer.
#[derive(Clone, Copy, Debug, Default)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    pub fn should_colorize(self) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => {
                std::io::IsTerminal::is_terminal(&std::io::stdout())
                    && std::io::IsTerminal::is_terminal(&std::io::stderr())
            }
        }
    }
}

fn main() {
    let matches = commands::build_cli().get_matches();
    let params = RunParams::from_matches(&matches);
    run::run(params.into());
}
