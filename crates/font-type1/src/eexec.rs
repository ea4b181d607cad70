//! The eexec cipher used for the private part of Type 1 fonts.

/// Initial key for eexec-encrypted sections.
pub const EEXEC_KEY: u16 = 55665;

const C1: u16 = 52845;
const C2: u16 = 22719;

/// Decrypt `cipher` starting from key `key`.
pub fn decrypt(cipher: &[u8], key: u16) -> Vec<u8> {
    let mut r = key;
    cipher
        .iter()
        .map(|&c| {
            let plain = c ^ (r >> 8) as u8;
            r = (c as u16).wrapping_add(r).wrapping_mul(C1).wrapping_add(C2);
            plain
        })
        .collect()
}

/// Encrypt `plain` starting from key `key`.
pub fn encrypt(plain: &[u8], key: u16) -> Vec<u8> {
    let mut r = key;
    plain
        .iter()
        .map(|&p| {
            let c = p ^ (r >> 8) as u8;
            r = (c as u16).wrapping_add(r).wrapping_mul(C1).wrapping_add(C2);
            c
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decrypt_inverts_encrypt() {
        let plain = b"\x00\x00\x00\x00dup /Private 8 dict dup begin";
        let cipher = encrypt(plain, EEXEC_KEY);
        assert_ne!(cipher.as_slice(), plain.as_slice());
        assert_eq!(decrypt(&cipher, EEXEC_KEY), plain);
    }

    #[test]
    fn test_known_first_byte() {
        // r >> 8 for the eexec key is 0xD9
        assert_eq!(encrypt(&[0], EEXEC_KEY), vec![0xD9]);
    }
}
