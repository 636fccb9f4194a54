//! Calculator tool: `add` and `mul` over integers

use async_trait::async_trait;
use chatbot_domain::tool::{CommandSpec, Tool, ToolIo};

/// Tool name constant
pub const CALC: &str = "calc";

pub struct CalcTool {
    commands: Vec<CommandSpec>,
}

impl CalcTool {
    pub fn new() -> Self {
        Self {
            commands: vec![
                CommandSpec::new("add", "add [n]... - print the sum of the integer arguments"),
                CommandSpec::new("mul", "mul [n]... - print the product of the integer arguments"),
            ],
        }
    }
}

impl Default for CalcTool {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_operands(args: &[String]) -> Result<Vec<i64>, String> {
    args.iter()
        .map(|a| {
            a.parse::<i64>()
                .map_err(|_| format!("calc: \"{}\" is not an integer\n", a))
        })
        .collect()
}

#[async_trait]
impl Tool for CalcTool {
    fn name(&self) -> &str {
        CALC
    }

    fn description(&self) -> &str {
        "Integer arithmetic"
    }

    fn commands(&self) -> &[CommandSpec] {
        &self.commands
    }

    async fn invoke(&self, argv: &[String], io: &mut ToolIo<'_>) -> i32 {
        let Some((command, args)) = argv.split_first() else {
            io.eprint("calc: no command given\n");
            return 2;
        };
        let operands = match parse_operands(args) {
            Ok(operands) => operands,
            Err(message) => {
                io.eprint(message);
                return 1;
            }
        };

        let result = match command.as_str() {
            "add" => operands.iter().try_fold(0i64, |acc, n| acc.checked_add(*n)),
            "mul" => operands.iter().try_fold(1i64, |acc, n| acc.checked_mul(*n)),
            other => {
                io.eprint(format!("calc: unknown command \"{}\"\n", other));
                return 2;
            }
        };

        match result {
            Some(value) => {
                io.print(format!("{}\n", value));
                0
            }
            None => {
                io.eprint("calc: integer overflow\n");
                1
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatbot_domain::tool::NoInput;

    async fn run(args: &[&str]) -> (i32, String) {
        let argv: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let mut input = NoInput;
        let mut io = ToolIo::new(&mut input);
        let status = CalcTool::new().invoke(&argv, &mut io).await;
        (status, io.into_output().text())
    }

    #[tokio::test]
    async fn test_add_and_mul() {
        assert_eq!(run(&["add", "1", "2"]).await, (0, "3\n".to_string()));
        assert_eq!(run(&["mul", "3", "-4"]).await, (0, "-12\n".to_string()));
        assert_eq!(run(&["add"]).await, (0, "0\n".to_string()));
    }

    #[tokio::test]
    async fn test_bad_operand() {
        let (status, text) = run(&["add", "1", "two"]).await;
        assert_eq!(status, 1);
        assert_eq!(text, "calc: \"two\" is not an integer\n");
    }

    #[tokio::test]
    async fn test_overflow() {
        let (status, _) = run(&["mul", "9223372036854775807", "2"]).await;
        assert_eq!(status, 1);
    }

    #[test]
    fn test_command_table() {
        let calc = CalcTool::new();
        assert!(calc.has_command("add"));
        assert!(calc.has_command("mul"));
        assert!(!calc.has_command("sub"));
    }
}
