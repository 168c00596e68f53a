use crate::transmission::TorrentRecord;

/// Telegram rejects messages longer than this, counted in UTF-16 code units.
pub const MAX_MESSAGE_LEN: usize = 4096;

const KIB: f64 = 1024.0;
const MIB: f64 = KIB * 1024.0;
const GIB: f64 = MIB * 1024.0;
const TIB: f64 = GIB * 1024.0;

/// Length as Telegram counts it.
pub fn text_len(s: &str) -> usize {
    s.encode_utf16().count()
}

pub fn format_size(bytes: i64) -> String {
    let b = bytes as f64;
    if b >= TIB {
        format!("{:.2} TB", b / TIB)
    } else if b >= GIB {
        format!("{:.2} GB", b / GIB)
    } else if b >= MIB {
        format!("{:.2} MB", b / MIB)
    } else if b >= KIB {
        format!("{:.2} KB", b / KIB)
    } else {
        format!("{bytes} B")
    }
}

/// `[id] name - 42.0% | Downloading | 1.20 GB`
pub fn torrent_line(t: &TorrentRecord) -> String {
    // a line per torrent, whatever the name contains
    let name = t.name.replace(['\r', '\n'], " ");
    let mut line = format!(
        "[{}] {} - {:.1}%",
        t.id,
        name,
        t.percent_done.unwrap_or_default() * 100.0
    );
    if let Some(status) = t.status {
        line.push_str(&format!(" | {status}"));
    }
    if let Some(size) = t.total_size {
        line.push_str(&format!(" | {}", format_size(size)));
    }
    line
}

/// Cut `line` so it fits in `max_len`, marking the cut with an ellipsis.
fn truncate(line: String, max_len: usize) -> String {
    if text_len(&line) <= max_len {
        return line;
    }
    let mut out = String::new();
    let mut len = 0;
    for c in line.chars() {
        if len + c.len_utf16() + 1 > max_len {
            break;
        }
        len += c.len_utf16();
        out.push(c);
    }
    out.push('…');
    out
}

/// Pack lines into as few messages as possible without splitting a line.
pub fn chunk_lines<I>(lines: I, max_len: usize) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut chunks = vec![];
    let mut current = String::new();
    let mut current_len = 0;
    for line in lines {
        let line = truncate(line, max_len);
        let len = text_len(&line);
        if current.is_empty() {
            current = line;
            current_len = len;
        } else if current_len + 1 + len <= max_len {
            current.push('\n');
            current.push_str(&line);
            current_len += 1 + len;
        } else {
            chunks.push(std::mem::replace(&mut current, line));
            current_len = len;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
