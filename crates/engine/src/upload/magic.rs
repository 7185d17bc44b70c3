//! File signature sniffing on the first four bytes of a file.

/// File kinds recognised by their leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagicKind {
    Png,
    Jpg,
    Pdf,
    Zip,
}

const SIGNATURES: &[(MagicKind, [u8; 4])] = &[
    (MagicKind::Png, [0x89, 0x50, 0x4e, 0x47]),
    (MagicKind::Jpg, [0xff, 0xd8, 0xff, 0xe0]),
    (MagicKind::Jpg, [0xff, 0xd8, 0xff, 0xe1]),
    (MagicKind::Jpg, [0xff, 0xd8, 0xff, 0xe2]),
    (MagicKind::Jpg, [0xff, 0xd8, 0xff, 0xe3]),
    (MagicKind::Jpg, [0xff, 0xd8, 0xff, 0xe8]),
    (MagicKind::Pdf, [0x25, 0x50, 0x44, 0x46]),
    (MagicKind::Zip, [0x50, 0x4b, 0x03, 0x04]),
    (MagicKind::Zip, [0x50, 0x4b, 0x05, 0x06]),
];

/// Identifies the file kind from its header. Headers shorter than four bytes
/// never match.
pub fn sniff(header: &[u8]) -> Option<MagicKind> {
    let prefix = header.get(..4)?;
    SIGNATURES
        .iter()
        .find(|(_, signature)| prefix == signature.as_slice())
        .map(|(kind, _)| *kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_known_signatures() {
        assert_eq!(sniff(b"%PDF-1.7"), Some(MagicKind::Pdf));
        assert_eq!(sniff(&[0x89, b'P', b'N', b'G', 0x0d]), Some(MagicKind::Png));
        assert_eq!(sniff(&[0xff, 0xd8, 0xff, 0xe8]), Some(MagicKind::Jpg));
        assert_eq!(sniff(b"PK\x05\x06"), Some(MagicKind::Zip));
    }

    #[test]
    fn rejects_unknown_or_short_headers() {
        assert_eq!(sniff(&[0xff, 0xd8, 0xff, 0xe4]), None);
        assert_eq!(sniff(b"%PD"), None);
        assert_eq!(sniff(b"GIF89a"), None);
    }
}
