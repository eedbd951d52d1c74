//! Command parsing for the prompt and one-shot invocations.

use std::fmt;
use std::str::FromStr;

use authdemo_core::DemoEndpoint;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Log in, optionally naming the user
    Login(Option<String>),
    Logout,
    /// Print the `User: X (roles)` line
    WhoAmI,
    /// Print the last status line and panel state
    Status,
    Demo(DemoEndpoint),
    /// Fire every demo request at once
    All,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let Some(name) = parts.next() else {
            return Err("Empty command".to_string());
        };
        let arg = parts.next().map(str::to_string);
        if parts.next().is_some() {
            return Err(format!("Too many arguments for {}", name));
        }

        let command = match name.to_lowercase().as_str() {
            "login" => return Ok(Command::Login(arg)),
            "logout" => Command::Logout,
            "whoami" => Command::WhoAmI,
            "status" => Command::Status,
            "all" => Command::All,
            "help" | "?" | "--help" | "-h" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => Command::Demo(other.parse()?),
        };

        match arg {
            Some(extra) => Err(format!("Unexpected argument: {}", extra)),
            None => Ok(command),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Login(Some(user)) => write!(f, "login {}", user),
            Command::Login(None) => f.write_str("login"),
            Command::Logout => f.write_str("logout"),
            Command::WhoAmI => f.write_str("whoami"),
            Command::Status => f.write_str("status"),
            Command::Demo(endpoint) => write!(f, "{}", endpoint),
            Command::All => f.write_str("all"),
            Command::Help => f.write_str("help"),
            Command::Quit => f.write_str("quit"),
        }
    }
}

pub const HELP: &str = "\
Commands:
  login [username]   Log in (password from AUTHDEMO_PASSWORD or prompt)
  logout             Forget the saved session
  whoami             Show the logged-in user and roles
  status             Show the last status line
  anonymous          GET demo/anonymous (no login needed)
  authenticated      GET demo/authenticated
  user               GET demo/user
  admin              GET demo/admin
  user-admin         GET demo/user-admin
  user-from-token    GET demo/user-fromtoken
  all                Call every demo endpoint at once
  help               Show this help
  quit               Exit";
