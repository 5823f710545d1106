//! Support for the gettext PO catalog format.
//!
//! A catalog starts with a header entry (`msgid ""`) whose `msgstr` holds
//! `Key: Value\n` metadata lines, followed by one block per entry:
//!
//! ```text
//! # translator comment
//! #. extracted comment
//! #: reference
//! #, flag
//! msgctxt "context"
//! msgid "one item"
//! msgid_plural "%d items"
//! msgstr[0] "un élément"
//! msgstr[1] "%d éléments"
//! ```
//!
//! Obsolete entries are kept and written back with the `#~ ` prefix.
use std::{
    fs::File,
    io::{BufRead, BufReader, Write},
    path::{Path, PathBuf},
};

use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    error::Error,
    traits::{CatalogCodec, Parser},
    types::{Catalog, CatalogEntry, Headers},
};

lazy_static! {
    static ref NPLURALS: Regex = Regex::new(r"nplurals\s*=\s*(\d+)").unwrap();
}

/// [`CatalogCodec`] reading and writing `.po` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct PoCodec;

impl CatalogCodec for PoCodec {
    fn decode(&self, path: &Path) -> Result<Catalog, Error> {
        let file = File::open(path).map_err(|e| decode_error(path, 0, e.to_string()))?;
        // Auto-detect BOM, decode to UTF-8; passthrough UTF-8
        let decoder = encoding_rs_io::DecodeReaderBytesBuilder::new()
            .bom_override(true)
            .strip_bom(true)
            .build(file);

        Catalog::from_reader(BufReader::new(decoder)).map_err(|e| match e {
            Error::CatalogDecode { line, message, .. } => decode_error(path, line, message),
            other => decode_error(path, 0, other.to_string()),
        })
    }

    fn encode(&self, catalog: &Catalog, path: &Path) -> Result<(), Error> {
        let mut content = Vec::new();
        catalog.to_writer(&mut content)?;
        std::fs::write(path, content).map_err(|source| Error::CatalogWrite {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn decode_error(path: &Path, line: usize, message: impl Into<String>) -> Error {
    Error::CatalogDecode {
        path: path.to_path_buf(),
        line,
        message: message.into(),
    }
}

/// Field a quoted continuation line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Context,
    Id,
    IdPlural,
    Str(usize),
}

/// Entry being assembled while reading lines.
#[derive(Debug, Default)]
struct Pending {
    comments: Vec<String>,
    extracted_comments: Vec<String>,
    references: Vec<String>,
    flags: Vec<String>,
    context: Option<String>,
    msgid: Option<String>,
    msgid_plural: Option<String>,
    msgstr: Vec<String>,
    obsolete: bool,
    field: Option<Field>,
    start_line: usize,
}

impl Pending {
    fn has_msgstr(&self) -> bool {
        !self.msgstr.is_empty()
    }

    fn is_blank(&self) -> bool {
        self.msgid.is_none()
            && self.context.is_none()
            && !self.has_msgstr()
            && self.comments.is_empty()
            && self.extracted_comments.is_empty()
            && self.references.is_empty()
            && self.flags.is_empty()
    }

    fn field_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Context => self.context.get_or_insert_with(String::new),
            Field::Id => self.msgid.get_or_insert_with(String::new),
            Field::IdPlural => self.msgid_plural.get_or_insert_with(String::new),
            Field::Str(index) => {
                if self.msgstr.len() <= index {
                    self.msgstr.resize(index + 1, String::new());
                }
                &mut self.msgstr[index]
            }
        }
    }
}

struct Reader {
    catalog: Catalog,
    pending: Pending,
    seen_header: bool,
}

impl Reader {
    fn flush(&mut self) -> Result<(), Error> {
        let pending = std::mem::take(&mut self.pending);
        if pending.is_blank() {
            return Ok(());
        }
        let Some(msgid) = pending.msgid else {
            if pending.context.is_none() && pending.msgstr.is_empty() {
                // Trailing comments without an entry.
                return Ok(());
            }
            return Err(syntax_error(pending.start_line, "entry without msgid"));
        };
        if pending.msgstr.is_empty() {
            return Err(syntax_error(pending.start_line, "entry without msgstr"));
        }

        if msgid.is_empty() && pending.context.is_none() && !pending.obsolete && !self.seen_header
        {
            self.seen_header = true;
            self.catalog.headers = parse_headers(&pending.msgstr[0]);
            if let Some(language) = self.catalog.headers.get("Language") {
                self.catalog.language = language.trim().to_lowercase();
            }
            return Ok(());
        }

        let mut msgstr = pending.msgstr.into_iter();
        let translation = msgstr.next().unwrap_or_default();
        let (plural_translation, extra_plural_translations) = match pending.msgid_plural {
            Some(_) => (Some(msgstr.next().unwrap_or_default()), msgstr.collect()),
            None => (None, Vec::new()),
        };

        self.catalog.append(CatalogEntry {
            context: pending.context,
            singular: msgid,
            plural: pending.msgid_plural,
            translation,
            plural_translation,
            extra_plural_translations,
            comments: pending.comments,
            extracted_comments: pending.extracted_comments,
            references: pending.references,
            flags: pending.flags,
            obsolete: pending.obsolete,
        });
        Ok(())
    }

    fn read_line(&mut self, number: usize, line: &str) -> Result<(), Error> {
        let mut line = line.trim();
        if line.is_empty() {
            return self.flush();
        }

        let mut obsolete = false;
        if let Some(rest) = line.strip_prefix("#~") {
            obsolete = true;
            line = rest.trim_start();
            if line.is_empty() || line.starts_with('|') {
                return Ok(());
            }
        } else if line.starts_with('#') {
            if self.pending.has_msgstr() {
                self.flush()?;
            }
            self.start(number);
            return self.read_comment(line);
        }

        if line.starts_with('"') {
            let field = self
                .pending
                .field
                .ok_or_else(|| syntax_error(number, "string without keyword"))?;
            let value = unquote(line).map_err(|m| syntax_error(number, m))?;
            self.pending.field_mut(field).push_str(&value);
            return Ok(());
        }

        let (keyword, rest) = line
            .split_once(|c: char| c.is_whitespace())
            .ok_or_else(|| syntax_error(number, format!("unexpected line `{}`", line)))?;
        let field = match keyword {
            "msgctxt" => Field::Context,
            "msgid" => Field::Id,
            "msgid_plural" => Field::IdPlural,
            "msgstr" => Field::Str(0),
            _ => match keyword
                .strip_prefix("msgstr[")
                .and_then(|s| s.strip_suffix(']'))
                .and_then(|s| s.parse::<usize>().ok())
            {
                Some(index) => Field::Str(index),
                None => {
                    return Err(syntax_error(
                        number,
                        format!("unknown keyword `{}`", keyword),
                    ));
                }
            },
        };

        // A new msgctxt/msgid after a msgstr starts the next entry.
        if matches!(field, Field::Context | Field::Id) && self.pending.has_msgstr() {
            self.flush()?;
        }
        self.start(number);
        self.pending.obsolete |= obsolete;

        let value = unquote(rest).map_err(|m| syntax_error(number, m))?;
        let slot = self.pending.field_mut(field);
        slot.clear();
        slot.push_str(&value);
        self.pending.field = Some(field);
        Ok(())
    }

    fn read_comment(&mut self, line: &str) -> Result<(), Error> {
        let pending = &mut self.pending;
        if let Some(rest) = line.strip_prefix("#.") {
            pending.extracted_comments.push(strip_one_space(rest).to_string());
        } else if let Some(rest) = line.strip_prefix("#:") {
            pending
                .references
                .extend(rest.split_whitespace().map(str::to_string));
        } else if let Some(rest) = line.strip_prefix("#,") {
            pending.flags.extend(
                rest.split(',')
                    .map(str::trim)
                    .filter(|f| !f.is_empty())
                    .map(str::to_string),
            );
        } else if line.starts_with("#|") {
            // Previous msgid, not kept.
        } else {
            let rest = &line[1..];
            pending.comments.push(strip_one_space(rest).to_string());
        }
        Ok(())
    }

    fn start(&mut self, number: usize) {
        if self.pending.start_line == 0 {
            self.pending.start_line = number;
        }
    }
}

fn strip_one_space(s: &str) -> &str {
    s.strip_prefix(' ').unwrap_or(s)
}

fn syntax_error(line: usize, message: impl Into<String>) -> Error {
    Error::CatalogDecode {
        path: PathBuf::new(),
        line,
        message: message.into(),
    }
}

fn parse_headers(raw: &str) -> Headers {
    let mut headers = Headers::new();
    for line in raw.lines() {
        if let Some((key, value)) = line.split_once(':') {
            let key = key.trim();
            if !key.is_empty() {
                headers.set(key, value.trim());
            }
        }
    }
    headers
}

/// Strips the surrounding quotes of a PO string and resolves escapes.
fn unquote(s: &str) -> Result<String, String> {
    let s = s.trim();
    if s.len() < 2 || !s.starts_with('"') || !s.ends_with('"') {
        return Err(format!("invalid string: {}", s));
    }
    let inner = &s[1..s.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('r') => out.push('\r'),
                Some('t') => out.push('\t'),
                Some('a') => out.push('\u{07}'),
                Some('b') => out.push('\u{08}'),
                Some('f') => out.push('\u{0C}'),
                Some('v') => out.push('\u{0B}'),
                Some(other) => out.push(other),
                None => return Err(format!("unterminated escape: {}", s)),
            }
        } else if c == '"' {
            return Err(format!("unescaped quote: {}", s));
        } else {
            out.push(c);
        }
    }
    Ok(out)
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 8);
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out
}

/// Writes `keyword "value"`, switching to the multi-line layout when the value
/// contains line breaks before its last character.
fn write_field<W: Write>(w: &mut W, prefix: &str, keyword: &str, value: &str) -> Result<(), Error> {
    let lines: Vec<&str> = value.split_inclusive('\n').collect();
    if lines.len() > 1 {
        writeln!(w, "{}{} \"\"", prefix, keyword)?;
        for line in lines {
            writeln!(w, "{}\"{}\"", prefix, escape(line))?;
        }
    } else {
        writeln!(w, "{}{} \"{}\"", prefix, keyword, escape(value))?;
    }
    Ok(())
}

/// Lines of a comment; a comment line cannot hold a line break.
fn comment_lines(comment: &str) -> impl Iterator<Item = &str> {
    comment.split('\n').map(|line| line.trim_end_matches('\r'))
}

fn write_entry<W: Write>(w: &mut W, entry: &CatalogEntry, nplurals: usize) -> Result<(), Error> {
    for line in entry.comments.iter().flat_map(|c| comment_lines(c)) {
        if line.is_empty() {
            writeln!(w, "#")?;
        } else {
            writeln!(w, "# {}", line)?;
        }
    }
    for line in entry.extracted_comments.iter().flat_map(|c| comment_lines(c)) {
        writeln!(w, "#. {}", line)?;
    }
    if !entry.references.is_empty() {
        writeln!(w, "#: {}", entry.references.join(" "))?;
    }
    if !entry.flags.is_empty() {
        writeln!(w, "#, {}", entry.flags.join(", "))?;
    }

    let prefix = if entry.obsolete { "#~ " } else { "" };
    if let Some(context) = &entry.context {
        write_field(w, prefix, "msgctxt", context)?;
    }
    write_field(w, prefix, "msgid", &entry.singular)?;

    match &entry.plural {
        Some(plural) => {
            write_field(w, prefix, "msgid_plural", plural)?;
            let mut forms: Vec<&str> = vec![
                entry.translation.as_str(),
                entry.plural_translation.as_deref().unwrap_or_default(),
            ];
            forms.extend(entry.extra_plural_translations.iter().map(String::as_str));
            while forms.len() < nplurals {
                forms.push("");
            }
            for (index, form) in forms.iter().enumerate() {
                write_field(w, prefix, &format!("msgstr[{}]", index), form)?;
            }
        }
        None => write_field(w, prefix, "msgstr", &entry.translation)?,
    }
    Ok(())
}

/// Number of plural forms declared by the `Plural-Forms` header, if any.
pub fn nplurals(headers: &Headers) -> Option<usize> {
    let rule = headers.get("Plural-Forms")?;
    NPLURALS
        .captures(rule)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

impl Parser for Catalog {
    /// Parse from any reader.
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        let mut state = Reader {
            catalog: Catalog::default(),
            pending: Pending::default(),
            seen_header: false,
        };
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            state.read_line(index + 1, &line)?;
        }
        state.flush()?;
        Ok(state.catalog)
    }

    /// Write to any writer (file, memory, etc.).
    fn to_writer<W: Write>(&self, mut writer: W) -> Result<(), Error> {
        writeln!(writer, "msgid \"\"")?;
        writeln!(writer, "msgstr \"\"")?;
        for (key, value) in self.headers.iter() {
            writeln!(writer, "\"{}\"", escape(&format!("{}: {}\n", key, value)))?;
        }

        let nplurals = nplurals(&self.headers).unwrap_or(2);
        for entry in &self.entries {
            writeln!(writer)?;
            write_entry(&mut writer, entry, nplurals)?;
        }
        writer.flush()?;
        Ok(())
    }
}
