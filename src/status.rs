use crate::constants::{CHANGE_KIND_ATTR, LOCAL_ATTR, PENDING_CHANGE_TAG};
use crate::ledger::PendingChange;
use anyhow::{Context, Result, bail};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// parse the output of `status /format:xml` into pending change records
///
/// every `PendingChange` element is taken regardless of depth, other elements
/// are ignored. a missing `local` or `chg` attribute becomes an empty string
pub fn parse_status(xml: &str) -> Result<Vec<PendingChange>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut changes = Vec::new();
    let mut saw_element = false;

    loop {
        let event = reader.read_event().with_context(|| {
            format!(
                "malformed status output at byte {}",
                reader.error_position()
            )
        })?;

        match event {
            Event::Start(element) | Event::Empty(element) => {
                saw_element = true;
                if element.name().as_ref() == PENDING_CHANGE_TAG {
                    changes.push(pending_change(&element)?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    // plain text (e.g. an error banner) is not a status report
    if !saw_element {
        bail!("status output is not an xml document");
    }

    Ok(changes)
}

fn pending_change(element: &BytesStart) -> Result<PendingChange> {
    let mut local_path = String::new();
    let mut change_kind = String::new();

    for attr in element.attributes() {
        let attr = attr.context("malformed attribute in status output")?;
        let target = match attr.key.as_ref() {
            LOCAL_ATTR => &mut local_path,
            CHANGE_KIND_ATTR => &mut change_kind,
            _ => continue,
        };
        *target = attr
            .unescape_value()
            .context("malformed attribute value in status output")?
            .into_owned();
    }

    Ok(PendingChange::new(local_path, change_kind))
}
