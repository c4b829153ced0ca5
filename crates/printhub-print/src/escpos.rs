// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ESC/POS document model.
//
// A document is an append-only list of typed instructions. The builder
// methods only ever push onto that list (composites such as `header` and
// `table_row` expand into primitives at push time) and a single pure
// function, `render`, reduces the list to device bytes. Nothing is
// reordered or coalesced: the byte stream follows the call sequence exactly.

use std::fmt::Display;

use printhub_core::types::{DEFAULT_ENCODING, EncodedJob};

use crate::charset::Charset;

/// Fixed control sequences. These are what the device firmware matches on
/// and must stay byte-for-byte as they are.
pub mod cmd {
    /// ESC @: reset the printer to power-on state.
    pub const INIT: &[u8] = b"\x1b@";

    pub const BOLD_ON: &[u8] = b"\x1b\x45\x01";
    pub const BOLD_OFF: &[u8] = b"\x1b\x45\x00";
    pub const UNDERLINE_ON: &[u8] = b"\x1b\x2d\x01";
    pub const UNDERLINE_OFF: &[u8] = b"\x1b\x2d\x00";

    pub const ALIGN_LEFT: &[u8] = b"\x1b\x61\x00";
    pub const ALIGN_CENTER: &[u8] = b"\x1b\x61\x01";
    pub const ALIGN_RIGHT: &[u8] = b"\x1b\x61\x02";

    pub const SIZE_NORMAL: &[u8] = b"\x1b\x21\x00";
    pub const SIZE_DOUBLE_HEIGHT: &[u8] = b"\x1b\x21\x10";
    pub const SIZE_DOUBLE_WIDTH: &[u8] = b"\x1b\x21\x20";
    pub const SIZE_DOUBLE: &[u8] = b"\x1b\x21\x30";

    /// GS V 0
    pub const CUT_FULL: &[u8] = b"\x1d\x56\x00";
    /// GS V 1
    pub const CUT_PARTIAL: &[u8] = b"\x1d\x56\x01";
    pub const FEED_LINE: u8 = b'\n';

    pub const CHARSET_USA: &[u8] = b"\x1b\x52\x00";
    pub const CHARSET_FRANCE: &[u8] = b"\x1b\x52\x01";
    pub const CHARSET_GERMANY: &[u8] = b"\x1b\x52\x02";

    /// ESC v: firmware/status query used by the enhanced probe.
    pub const STATUS_QUERY: &[u8] = b"\x1b\x76";
}

/// Characters per line on a standard 58 mm roll.
pub const LINE_WIDTH: usize = 32;

/// Suffix marking a truncated table cell.
pub const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSize {
    Normal,
    DoubleHeight,
    DoubleWidth,
    Double,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutMode {
    Full,
    Partial,
}

/// International character set selected with `ESC R n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Usa,
    France,
    Germany,
}

/// One primitive device operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Initialize,
    Text(String),
    /// `n` line feeds; never zero.
    Feed(usize),
    Bold(bool),
    Underline(bool),
    Align(Alignment),
    Size(TextSize),
    Cut(CutMode),
    Region(Region),
}

impl Instruction {
    fn control(&self) -> &'static [u8] {
        match self {
            Self::Initialize => cmd::INIT,
            Self::Bold(true) => cmd::BOLD_ON,
            Self::Bold(false) => cmd::BOLD_OFF,
            Self::Underline(true) => cmd::UNDERLINE_ON,
            Self::Underline(false) => cmd::UNDERLINE_OFF,
            Self::Align(Alignment::Left) => cmd::ALIGN_LEFT,
            Self::Align(Alignment::Center) => cmd::ALIGN_CENTER,
            Self::Align(Alignment::Right) => cmd::ALIGN_RIGHT,
            Self::Size(TextSize::Normal) => cmd::SIZE_NORMAL,
            Self::Size(TextSize::DoubleHeight) => cmd::SIZE_DOUBLE_HEIGHT,
            Self::Size(TextSize::DoubleWidth) => cmd::SIZE_DOUBLE_WIDTH,
            Self::Size(TextSize::Double) => cmd::SIZE_DOUBLE,
            Self::Cut(CutMode::Full) => cmd::CUT_FULL,
            Self::Cut(CutMode::Partial) => cmd::CUT_PARTIAL,
            Self::Region(Region::Usa) => cmd::CHARSET_USA,
            Self::Region(Region::France) => cmd::CHARSET_FRANCE,
            Self::Region(Region::Germany) => cmd::CHARSET_GERMANY,
            Self::Text(_) | Self::Feed(_) => &[],
        }
    }
}

/// Reduce an instruction list to device bytes.
pub fn render(instructions: &[Instruction], charset: Charset) -> Vec<u8> {
    let mut out = Vec::new();
    for instruction in instructions {
        match instruction {
            Instruction::Text(content) => out.extend(charset.encode(content)),
            Instruction::Feed(n) => out.extend(std::iter::repeat_n(cmd::FEED_LINE, *n)),
            other => out.extend_from_slice(other.control()),
        }
    }
    out
}

/// Fluent builder over an instruction list. Every document starts with
/// `Initialize`.
#[derive(Debug, Clone)]
pub struct EscPos {
    encoding: String,
    instructions: Vec<Instruction>,
}

impl Default for EscPos {
    fn default() -> Self {
        Self::new()
    }
}

impl EscPos {
    pub fn new() -> Self {
        Self::with_encoding(DEFAULT_ENCODING)
    }

    /// Start a document whose text is encoded with `label`.
    pub fn with_encoding(label: &str) -> Self {
        Self {
            encoding: label.to_string(),
            instructions: vec![Instruction::Initialize],
        }
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn text(&mut self, content: &str) -> &mut Self {
        self.instructions.push(Instruction::Text(content.to_string()));
        self
    }

    pub fn line(&mut self, content: &str) -> &mut Self {
        self.text(content).feed(1)
    }

    pub fn bold(&mut self, on: bool) -> &mut Self {
        self.instructions.push(Instruction::Bold(on));
        self
    }

    pub fn underline(&mut self, on: bool) -> &mut Self {
        self.instructions.push(Instruction::Underline(on));
        self
    }

    pub fn align(&mut self, alignment: Alignment) -> &mut Self {
        self.instructions.push(Instruction::Align(alignment));
        self
    }

    pub fn size(&mut self, size: TextSize) -> &mut Self {
        self.instructions.push(Instruction::Size(size));
        self
    }

    pub fn region(&mut self, region: Region) -> &mut Self {
        self.instructions.push(Instruction::Region(region));
        self
    }

    /// Emit `lines` line feeds. Zero is a no-op.
    pub fn feed(&mut self, lines: usize) -> &mut Self {
        if lines > 0 {
            self.instructions.push(Instruction::Feed(lines));
        }
        self
    }

    pub fn cut(&mut self, mode: CutMode) -> &mut Self {
        self.instructions.push(Instruction::Cut(mode));
        self
    }

    /// A line of `ch` repeated `width` times.
    pub fn separator(&mut self, ch: char, width: usize) -> &mut Self {
        let rule: String = std::iter::repeat_n(ch, width).collect();
        self.line(&rule)
    }

    /// Centered, bold, double-size title, then back to normal left-aligned
    /// text and one blank line.
    pub fn header(&mut self, title: &str) -> &mut Self {
        self.align(Alignment::Center)
            .bold(true)
            .size(TextSize::Double)
            .line(title)
            .size(TextSize::Normal)
            .bold(false)
            .align(Alignment::Left)
            .feed(1)
    }

    /// `key` padded to `key_width`, a space, then `value`.
    pub fn key_value(&mut self, key: &str, value: &str, key_width: usize) -> &mut Self {
        let formatted = format!("{key:<key_width$} {value}");
        self.line(&formatted)
    }

    /// One table row; see [`format_row`].
    pub fn table_row<T: Display>(&mut self, columns: &[T], widths: Option<&[usize]>) -> &mut Self {
        let row = format_row(columns, widths);
        self.line(&row)
    }

    /// Render the document.
    pub fn build(&self) -> EncodedJob {
        let charset = Charset::resolve_or_utf8(&self.encoding);
        EncodedJob::new(render(&self.instructions, charset))
    }
}

/// Lay out one table row.
///
/// Without `widths` the 32-column line is split evenly (remainder dropped).
/// Over-long cells are cut to `width - 3` characters plus `...`. Every column
/// but the last is left-aligned; the last is right-aligned.
pub fn format_row<T: Display>(columns: &[T], widths: Option<&[usize]>) -> String {
    let even;
    let widths = match widths {
        Some(w) => w,
        None => {
            even = vec![LINE_WIDTH / columns.len().max(1); columns.len()];
            &even[..]
        }
    };

    let last = columns.len().saturating_sub(1);
    let mut row = String::new();
    for (idx, (column, &width)) in columns.iter().zip(widths).enumerate() {
        let cell = fit_cell(&column.to_string(), width);
        if idx == last {
            row.push_str(&format!("{cell:>width$}"));
        } else {
            row.push_str(&format!("{cell:<width$}"));
        }
    }
    row
}

/// Truncate `value` to `width` characters, ending in `...`.
///
/// Below three columns there is no room for text and an ellipsis, so the
/// cell is `width` dots.
pub fn fit_cell(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    if width < ELLIPSIS.len() {
        return ".".repeat(width);
    }
    let mut cell: String = value.chars().take(width - ELLIPSIS.len()).collect();
    cell.push_str(ELLIPSIS);
    cell
}
