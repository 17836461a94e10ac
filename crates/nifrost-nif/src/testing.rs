//! Byte-level builders for synthetic documents.

use nifrost_common::{ByteCursor, Endian};

use crate::gate::v;
use crate::header::BsStreamHeader;
use crate::reader::{NifRead, NifReader};
use crate::version::{Version, VersionContext};

pub(crate) fn ctx(version: Version, user_version: u32, user_version_2: u32) -> VersionContext {
    VersionContext::new(version, user_version, user_version_2)
}

/// Decode what `w` wrote as one `T`. Returns the value and the number of
/// bytes left unread.
pub(crate) fn decode<T: NifRead>(w: &mut NifWriter) -> crate::Result<(T, usize)> {
    let strings = w.strings.clone();
    let bytes = w.finish();
    let mut cursor = ByteCursor::new(&bytes);
    let value = NifReader::new(&mut cursor, w.ctx, &strings).read()?;
    Ok((value, cursor.remaining()))
}

/// Decode one `T` from literal bytes. Returns the value and the number of
/// bytes left unread.
pub(crate) fn decode_bytes<T: NifRead>(
    bytes: &[u8],
    ctx: VersionContext,
    strings: &[String],
) -> crate::Result<(T, usize)> {
    let mut cursor = ByteCursor::new(bytes);
    let value = NifReader::new(&mut cursor, ctx, strings).read()?;
    Ok((value, cursor.remaining()))
}

/// Parse a hex dump. Whitespace separates bytes and `#` starts a comment
/// that runs to the end of the line.
pub(crate) fn hex(dump: &str) -> Vec<u8> {
    dump.lines()
        .map(|line| line.split('#').next().unwrap_or(""))
        .flat_map(str::split_whitespace)
        .map(|byte| u8::from_str_radix(byte, 16).unwrap())
        .collect()
}

/// Writes fields the way [`crate::reader::NifReader`] reads them.
pub(crate) struct NifWriter {
    ctx: VersionContext,
    endian: Endian,
    buf: Vec<u8>,
    strings: Vec<String>,
}

impl NifWriter {
    pub(crate) fn new(ctx: VersionContext) -> Self {
        Self {
            ctx,
            endian: Endian::Little,
            buf: Vec::new(),
            strings: Vec::new(),
        }
    }

    fn raw<const N: usize>(&mut self, le: [u8; N]) -> &mut Self {
        let mut bytes = le;
        if self.endian == Endian::Big {
            bytes.reverse();
        }
        self.buf.extend_from_slice(&bytes);
        self
    }

    pub(crate) fn u8(&mut self, x: u8) -> &mut Self {
        self.buf.push(x);
        self
    }

    pub(crate) fn u16(&mut self, x: u16) -> &mut Self {
        self.raw(x.to_le_bytes())
    }

    pub(crate) fn i16(&mut self, x: i16) -> &mut Self {
        self.raw(x.to_le_bytes())
    }

    pub(crate) fn u32(&mut self, x: u32) -> &mut Self {
        self.raw(x.to_le_bytes())
    }

    pub(crate) fn i32(&mut self, x: i32) -> &mut Self {
        self.raw(x.to_le_bytes())
    }

    pub(crate) fn u64(&mut self, x: u64) -> &mut Self {
        self.raw(x.to_le_bytes())
    }

    pub(crate) fn f32(&mut self, x: f32) -> &mut Self {
        self.raw(x.to_le_bytes())
    }

    pub(crate) fn f16(&mut self, x: f32) -> &mut Self {
        self.raw(half::f16::from_f32(x).to_le_bytes())
    }

    pub(crate) fn f32s(&mut self, xs: &[f32]) -> &mut Self {
        for &x in xs {
            self.f32(x);
        }
        self
    }

    pub(crate) fn bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    pub(crate) fn bool(&mut self, x: bool) -> &mut Self {
        if self.ctx.version() < v::V4_1_0_1 {
            self.u32(x as u32)
        } else {
            self.u8(x as u8)
        }
    }

    pub(crate) fn link(&mut self, raw: i32) -> &mut Self {
        self.i32(raw)
    }

    /// u32 count followed by links.
    pub(crate) fn links(&mut self, raws: &[i32]) -> &mut Self {
        self.u32(raws.len() as u32);
        for &raw in raws {
            self.link(raw);
        }
        self
    }

    pub(crate) fn sized_string(&mut self, s: &str) -> &mut Self {
        self.u32(s.len() as u32);
        self.bytes(s.as_bytes())
    }

    /// Inline before 20.1.0.1, a string table index after.
    pub(crate) fn string(&mut self, s: &str) -> &mut Self {
        if self.ctx.version() < v::V20_1_0_1 {
            return self.sized_string(s);
        }
        let index = match self.strings.iter().position(|x| x == s) {
            Some(i) => i,
            None => {
                self.strings.push(s.to_owned());
                self.strings.len() - 1
            }
        };
        self.u32(index as u32)
    }

    pub(crate) fn len(&self) -> usize {
        self.buf.len()
    }

    pub(crate) fn finish(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buf)
    }
}

/// Assembles a complete file: banner, header tables, blocks, footer.
pub(crate) struct DocBuilder {
    ctx: VersionContext,
    endian: Endian,
    author: String,
    banner: Option<String>,
    blocks: Vec<(String, Vec<u8>)>,
    strings: Vec<String>,
    roots: Option<Vec<i32>>,
    size_overrides: Vec<(usize, u32)>,
    trailing: Vec<u8>,
}

impl DocBuilder {
    pub(crate) fn new(version: Version, user_version: u32, user_version_2: u32) -> Self {
        Self {
            ctx: ctx(version, user_version, user_version_2),
            endian: Endian::Little,
            author: String::new(),
            banner: None,
            blocks: Vec::new(),
            strings: Vec::new(),
            roots: None,
            size_overrides: Vec::new(),
            trailing: Vec::new(),
        }
    }

    pub(crate) fn context(&self) -> VersionContext {
        self.ctx
    }

    pub(crate) fn big_endian(&mut self) -> &mut Self {
        self.endian = Endian::Big;
        self
    }

    pub(crate) fn author(&mut self, author: &str) -> &mut Self {
        self.author = author.to_owned();
        self
    }

    pub(crate) fn banner(&mut self, text: &str) -> &mut Self {
        self.banner = Some(text.to_owned());
        self
    }

    /// Append a block whose body is written by `f`.
    pub(crate) fn block(&mut self, kind: &str, f: impl FnOnce(&mut NifWriter)) -> &mut Self {
        let mut w = NifWriter::new(self.ctx);
        w.endian = self.endian;
        w.strings = std::mem::take(&mut self.strings);
        f(&mut w);
        self.strings = std::mem::take(&mut w.strings);
        self.blocks.push((kind.to_owned(), w.finish()));
        self
    }

    pub(crate) fn raw_block(&mut self, kind: &str, body: &[u8]) -> &mut Self {
        self.blocks.push((kind.to_owned(), body.to_vec()));
        self
    }

    pub(crate) fn roots(&mut self, roots: &[i32]) -> &mut Self {
        self.roots = Some(roots.to_vec());
        self
    }

    /// Declare a wrong size for block `index` in the size table.
    pub(crate) fn declared_size(&mut self, index: usize, size: u32) -> &mut Self {
        self.size_overrides.push((index, size));
        self
    }

    pub(crate) fn trailing(&mut self, bytes: &[u8]) -> &mut Self {
        self.trailing.extend_from_slice(bytes);
        self
    }

    pub(crate) fn build(&mut self) -> Vec<u8> {
        let version = self.ctx.version();
        let gated = |lo: Version| version >= lo;

        let banner = self.banner.clone().unwrap_or_else(|| {
            let vendor = if version < v::V10_0_1_0 {
                "NetImmerse"
            } else {
                "Gamebryo"
            };
            format!("{vendor} File Format, Version {version}")
        });

        let mut w = NifWriter::new(self.ctx);
        w.bytes(banner.as_bytes()).u8(b'\n');
        w.u32(version.raw());
        if gated(v::V20_0_0_3) {
            w.u8(if self.endian == Endian::Big { 0 } else { 1 });
        }
        w.endian = self.endian;
        if gated(v::V10_0_1_8) {
            w.u32(self.ctx.user_version());
        }
        w.u32(self.blocks.len() as u32);

        if BsStreamHeader::is_present(version, self.ctx.user_version()) {
            let bs = self.ctx.user_version_2();
            w.u32(bs);
            export_string(&mut w, &self.author);
            if bs > 130 {
                w.u32(0);
            }
            if bs < 131 {
                export_string(&mut w, "");
            }
            export_string(&mut w, "");
            if bs >= 103 {
                export_string(&mut w, "");
            }
        }

        if gated(v::V5_0_0_1) {
            let mut types: Vec<&str> = Vec::new();
            let mut index = Vec::new();
            for (kind, _) in &self.blocks {
                let i = match types.iter().position(|t| *t == kind.as_str()) {
                    Some(i) => i,
                    None => {
                        types.push(kind);
                        types.len() - 1
                    }
                };
                index.push(i as u16);
            }
            w.u16(types.len() as u16);
            for t in &types {
                w.sized_string(t);
            }
            for i in index {
                w.u16(i);
            }
        }

        if gated(v::V20_2_0_5) {
            for (i, (_, body)) in self.blocks.iter().enumerate() {
                let size = self
                    .size_overrides
                    .iter()
                    .find(|(at, _)| *at == i)
                    .map_or(body.len() as u32, |(_, s)| *s);
                w.u32(size);
            }
        }

        if gated(v::V20_1_0_1) {
            w.u32(self.strings.len() as u32);
            w.u32(self.strings.iter().map(String::len).max().unwrap_or(0) as u32);
            for s in &self.strings {
                w.sized_string(s);
            }
        }

        if gated(v::V5_0_0_6) {
            w.u32(0);
        }

        for (kind, body) in &self.blocks {
            if version < v::V5_0_0_1 {
                w.sized_string(kind);
            } else if version <= v::V10_1_0_106 && !kind.starts_with("bhk") {
                w.u32(0);
            }
            w.bytes(body);
        }

        let roots = self.roots.clone().unwrap_or_else(|| {
            if self.blocks.is_empty() {
                Vec::new()
            } else {
                vec![0]
            }
        });
        w.u32(roots.len() as u32);
        for r in roots {
            w.i32(r);
        }
        w.bytes(&self.trailing);
        w.finish()
    }
}

fn export_string(w: &mut NifWriter, s: &str) {
    w.u8(s.len() as u8 + 1).bytes(s.as_bytes()).u8(0);
}
