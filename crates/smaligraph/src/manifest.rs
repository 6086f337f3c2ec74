//! C8: `AndroidManifest.xml` reader.
//!
//! Only two attributes are ever consulted — `android:name` on `<activity>`
//! and on `<uses-permission>` — so this walks the document with `quick-xml`'s
//! streaming `Reader` rather than building a DOM (`original_source/process_manifest.py`'s
//! `extract_activity_files`/`extract_permissions`).

use anyhow::{Context, Result};
use quick_xml::events::Event;
use quick_xml::Reader;

/// Every `<activity android:name="...">` converted to its smali file path:
/// dots become slashes, rooted under `smali/`, suffixed `.smali` (§6). A
/// malformed individual entry is skipped, not fatal — mirroring the source's
/// per-activity `try/except`.
pub fn extract_activity_files(manifest_xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(manifest_xml);
    reader.config_mut().trim_text(true);
    let mut files = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf).context("malformed manifest XML")? {
            Event::Eof => break,
            Event::Start(tag) | Event::Empty(tag) if tag.local_name().as_ref() == b"activity" => {
                if let Some(name) = read_android_name(&tag)? {
                    files.push(format!("smali/{}.smali", name.replace('.', "/")));
                }
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(files)
}

/// Every `<uses-permission android:name="...">`, reduced to its final
/// `.`-delimited segment (the core never inspects these further).
pub fn extract_permissions(manifest_xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(manifest_xml);
    reader.config_mut().trim_text(true);
    let mut permissions = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf).context("malformed manifest XML")? {
            Event::Eof => break,
            Event::Start(tag) | Event::Empty(tag) if tag.local_name().as_ref() == b"uses-permission" => {
                if let Some(name) = read_android_name(&tag)? {
                    let bare = name.rsplit('.').next().unwrap_or(&name).to_string();
                    permissions.push(bare);
                }
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(permissions)
}

fn read_android_name(tag: &quick_xml::events::BytesStart) -> Result<Option<String>> {
    for attr in tag.attributes() {
        let attr = attr.context("malformed attribute")?;
        if attr.key.local_name().as_ref() == b"name" {
            return Ok(Some(attr.unescape_value().context("malformed attribute value")?.into_owned()));
        }
    }
    Ok(None)
}
