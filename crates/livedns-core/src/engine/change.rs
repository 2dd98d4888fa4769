//! IP change detection

use crate::traits::IpRecord;

/// Whether the observed address differs from the last applied one
///
/// Plain string equality; no address parsing. The "no previous state"
/// sentinel is a loopback address, so it never equals an observed public
/// address and a first run always reconciles.
pub fn has_changed(current: &str, previous: &IpRecord) -> bool {
    current != previous.ip
}
