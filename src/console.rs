//! Interactive console: blocking pause prompts and pause-then-exit.

use std::env;
use std::io::{self, BufRead, Write};

const RED: &str = "\x1b[91m";
const RESET: &str = "\x1b[0m";
const CLEAR: &str = "\x1bc";

/// Default "press Enter" prompt in the user's language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PausePrompt {
    English,
    SimplifiedChinese,
    TraditionalChinese,
}

impl PausePrompt {
    pub fn text(self) -> &'static str {
        match self {
            PausePrompt::English => "Press Enter to continue. . .",
            PausePrompt::SimplifiedChinese => "请按回车键继续. . .",
            PausePrompt::TraditionalChinese => "請按Enter鍵繼續. . .",
        }
    }

    /// Pick a prompt from a POSIX locale name such as `zh_TW.UTF-8`.
    pub fn from_locale(locale: &str) -> Self {
        let locale = locale.replace('-', "_");
        let lang = locale.split('.').next().unwrap_or("");

        if !lang.starts_with("zh") {
            return PausePrompt::English;
        }
        if ["zh_TW", "zh_HK", "zh_MO", "zh_Hant"]
            .iter()
            .any(|p| lang.starts_with(p))
        {
            PausePrompt::TraditionalChinese
        } else {
            PausePrompt::SimplifiedChinese
        }
    }

    /// First non-empty of `LC_ALL`, `LC_MESSAGES`, `LANG`.
    pub fn from_env() -> Self {
        ["LC_ALL", "LC_MESSAGES", "LANG"]
            .iter()
            .filter_map(|key| env::var(key).ok())
            .find(|value| !value.is_empty())
            .map_or(PausePrompt::English, |value| Self::from_locale(&value))
    }
}

pub struct Console<R, W> {
    input: R,
    output: W,
    prompt: PausePrompt,
    pause_enabled: bool,
    color: bool,
}

impl Console<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio(pause_enabled: bool, color: bool) -> Self {
        Console::new(io::stdin().lock(), io::stdout(), PausePrompt::from_env())
            .pause_enabled(pause_enabled)
            .color(color)
    }
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W, prompt: PausePrompt) -> Self {
        Self {
            input,
            output,
            prompt,
            pause_enabled: true,
            color: true,
        }
    }

    pub fn pause_enabled(mut self, enabled: bool) -> Self {
        self.pause_enabled = enabled;
        self
    }

    pub fn color(mut self, enabled: bool) -> Self {
        self.color = enabled;
        self
    }

    /// Read one line without its terminator; `None` at end of input.
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    pub fn write(&mut self, text: &str) -> io::Result<()> {
        self.output.write_all(text.as_bytes())?;
        self.output.flush()
    }

    pub fn write_error(&mut self, text: &str) -> io::Result<()> {
        if self.color {
            writeln!(self.output, "{}{}{}", RED, text, RESET)?;
        } else {
            writeln!(self.output, "{}", text)?;
        }
        self.output.flush()
    }

    pub fn clear_screen(&mut self) -> io::Result<()> {
        if self.color {
            self.write(CLEAR)?;
        }
        Ok(())
    }

    /// Show `message` (or the default prompt) and wait for Enter.
    ///
    /// With pausing disabled only an explicit message is printed.
    pub fn pause(&mut self, message: Option<&str>) -> io::Result<()> {
        if !self.pause_enabled {
            if let Some(message) = message {
                writeln!(self.output, "{}", message)?;
                self.output.flush()?;
            }
            return Ok(());
        }

        let text = message.unwrap_or(self.prompt.text());
        writeln!(self.output, "{}", text)?;
        self.output.flush()?;
        // End of input counts as a keypress.
        self.read_line()?;
        Ok(())
    }

    /// Pause, then terminate the process with `code`.
    pub fn exit(mut self, message: Option<&str>, code: i32) -> ! {
        if let Err(e) = self.pause(message) {
            tracing::warn!(error = %e, "Pause before exit failed");
        }
        std::process::exit(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn console(input: &str) -> Console<Cursor<Vec<u8>>, Vec<u8>> {
        Console::new(
            Cursor::new(input.as_bytes().to_vec()),
            Vec::new(),
            PausePrompt::English,
        )
    }

    fn output(console: &Console<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(console.output.clone()).unwrap()
    }

    #[test]
    fn test_locale_selection() {
        assert_eq!(PausePrompt::from_locale("zh_CN.UTF-8"), PausePrompt::SimplifiedChinese);
        assert_eq!(PausePrompt::from_locale("zh_SG"), PausePrompt::SimplifiedChinese);
        assert_eq!(PausePrompt::from_locale("zh-Hans"), PausePrompt::SimplifiedChinese);
        assert_eq!(PausePrompt::from_locale("zh_TW.UTF-8"), PausePrompt::TraditionalChinese);
        assert_eq!(PausePrompt::from_locale("zh_HK"), PausePrompt::TraditionalChinese);
        assert_eq!(PausePrompt::from_locale("zh-Hant-TW"), PausePrompt::TraditionalChinese);
        assert_eq!(PausePrompt::from_locale("en_US.UTF-8"), PausePrompt::English);
        assert_eq!(PausePrompt::from_locale("C"), PausePrompt::English);
        assert_eq!(PausePrompt::from_locale(""), PausePrompt::English);
    }

    #[test]
    fn test_pause_consumes_one_line() {
        let mut console = console("\nnext\n");
        console.pause(None).unwrap();
        assert_eq!(output(&console), "Press Enter to continue. . .\n");
        assert_eq!(console.read_line().unwrap().as_deref(), Some("next"));
    }

    #[test]
    fn test_pause_with_message() {
        let mut console = console("\n");
        console.pause(Some("Done")).unwrap();
        assert_eq!(output(&console), "Done\n");
    }

    #[test]
    fn test_disabled_pause_reads_nothing() {
        let mut console = console("kept\n").pause_enabled(false);
        console.pause(None).unwrap();
        console.pause(Some("bye")).unwrap();
        assert_eq!(output(&console), "bye\n");
        assert_eq!(console.read_line().unwrap().as_deref(), Some("kept"));
    }

    #[test]
    fn test_pause_at_end_of_input() {
        let mut console = console("");
        console.pause(None).unwrap();
        assert_eq!(console.read_line().unwrap(), None);
    }

    #[test]
    fn test_read_line_strips_crlf() {
        let mut console = console("160000\r\n");
        assert_eq!(console.read_line().unwrap().as_deref(), Some("160000"));
    }

    #[test]
    fn test_error_coloring() {
        let mut colored = console("");
        colored.write_error("bad").unwrap();
        assert_eq!(output(&colored), "\x1b[91mbad\x1b[0m\n");

        let mut plain = console("").color(false);
        plain.write_error("bad").unwrap();
        plain.clear_screen().unwrap();
        assert_eq!(output(&plain), "bad\n");
    }
}
