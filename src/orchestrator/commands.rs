//! 终端命令解析

use phf::phf_map;

/// 支持的命令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Add,
    Remove,
    List,
    Process,
    Ask,
    Summary,
    Mcqs,
    Status,
    Reset,
    Help,
    Quit,
}

static COMMANDS: phf::Map<&'static str, Command> = phf_map! {
    "add" => Command::Add,
    "remove" => Command::Remove,
    "rm" => Command::Remove,
    "list" => Command::List,
    "ls" => Command::List,
    "process" => Command::Process,
    "ask" => Command::Ask,
    "summary" => Command::Summary,
    "summarize" => Command::Summary,
    "mcqs" => Command::Mcqs,
    "mcq" => Command::Mcqs,
    "status" => Command::Status,
    "reset" => Command::Reset,
    "help" => Command::Help,
    "quit" => Command::Quit,
    "exit" => Command::Quit,
};

pub const HELP_TEXT: &str = "\
Commands:
  add <path>        add a PDF file (or every PDF in a folder)
  remove <name>     remove a pending document by name
  list              list pending documents
  process           upload documents and start a session
  ask <question>    ask a question about the documents
  summary           summarize the documents
  mcqs              generate multiple-choice questions
  status            show session and operation status
  reset             drop all documents and the session
  help              show this help
  quit              exit";

/// 解析一行输入，返回命令和参数（参数已去掉首尾空白）
///
/// 命令名不区分大小写；空行或未知命令返回 None
pub fn parse_command(line: &str) -> Option<(Command, &str)> {
    let line = line.trim();
    let (name, arg) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };
    COMMANDS
        .get(name.to_ascii_lowercase().as_str())
        .map(|cmd| (*cmd, arg))
}
