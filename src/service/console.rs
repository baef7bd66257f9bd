use crate::{
    application::coordinator::ViewController,
    domain::{errors::CommandError, models::DataAccess},
};
use std::str::FromStr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use super::render;

const HELP: &str = "\
Commands:
  show                     redraw the transaction list
  employees                list employee ids
  filter <employee-id|all> show one employee's transactions, or everyone's
  more                     View More
  toggle <transaction-id>  approve or unapprove a transaction
  help                     this text
  quit                     leave
";

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Show,
    Employees,
    /// `None` clears the filter
    Filter(Option<String>),
    More,
    Toggle(String),
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let name = words.next().ok_or(CommandError::Empty)?;
        let argument = words.next();

        match name.to_ascii_lowercase().as_str() {
            "show" | "ls" => Ok(Command::Show),
            "employees" => Ok(Command::Employees),
            "filter" => match argument.ok_or(CommandError::MissingArgument("filter"))? {
                "all" | "*" => Ok(Command::Filter(None)),
                id => Ok(Command::Filter(Some(id.to_string()))),
            },
            "more" => Ok(Command::More),
            "toggle" => argument
                .map(|id| Command::Toggle(id.to_string()))
                .ok_or(CommandError::MissingArgument("toggle")),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// Reads commands line by line from `input` and prints the screen to `output`
/// after each one. Mounts the controller first.
pub async fn run<D, R, W>(
    controller: &ViewController<D>,
    input: R,
    mut output: W,
) -> anyhow::Result<()>
where
    D: DataAccess + Send + Sync,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    if let Err(e) = controller.mount().await {
        tracing::error!("Initial load failed: {:?}", e);
        output.write_all(format!("error: {}\n", e).as_bytes()).await?;
    }
    draw(controller, &mut output).await?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(CommandError::Empty) => continue,
            Err(e) => {
                output.write_all(format!("error: {}\n", e).as_bytes()).await?;
                continue;
            }
        };
        tracing::debug!("Running {:?}", command);

        let result = match command {
            Command::Quit => break,
            Command::Help => {
                output.write_all(HELP.as_bytes()).await?;
                continue;
            }
            Command::Employees => {
                for employee in controller.employee_options().await {
                    let id = if employee.is_empty_sentinel() {
                        "all"
                    } else {
                        employee.id.as_str()
                    };
                    output
                        .write_all(format!("  {:<6} {}\n", id, employee.full_name()).as_bytes())
                        .await?;
                }
                continue;
            }
            Command::Show => Ok(()),
            Command::More => controller.view_more().await,
            Command::Filter(None) => controller.load_all().await,
            Command::Filter(Some(id)) => match controller.find_employee(&id).await {
                Ok(employee) => controller.select_employee(&employee).await,
                Err(e) => Err(e),
            },
            Command::Toggle(id) => controller.toggle_approval(&id).await.map(|_| ()),
        };

        if let Err(e) = result {
            output.write_all(format!("error: {}\n", e).as_bytes()).await?;
        }
        draw(controller, &mut output).await?;
    }

    output.flush().await?;
    Ok(())
}

async fn draw<D, W>(controller: &ViewController<D>, output: &mut W) -> anyhow::Result<()>
where
    D: DataAccess + Send + Sync,
    W: AsyncWrite + Unpin,
{
    let view = render::screen(controller).await;
    output.write_all(format!("\n{}", view).as_bytes()).await?;
    output.flush().await?;
    Ok(())
}
