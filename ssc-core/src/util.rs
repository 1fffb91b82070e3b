use crate::consts::*;
use crate::error::Error;

use subtle::ConstantTimeEq;

/// Pads the trailing partial block using PKCS#7.
///
/// Always returns exactly one block, a full block of padding when `tail` is empty.
pub(crate) fn pad_block(tail: &[u8]) -> [u8; BLOCK_SIZE] {
    debug_assert!(tail.len() < BLOCK_SIZE);

    let pad = (BLOCK_SIZE - tail.len()) as u8;
    let mut block = [pad; BLOCK_SIZE];
    block[..tail.len()].copy_from_slice(tail);

    block
}

/// Strips PKCS#7 padding in place.
pub(crate) fn unpad(buf: &mut Vec<u8>) -> Result<(), Error> {
    if buf.is_empty() || buf.len() % BLOCK_SIZE != 0 {
        return Err(Error::InvalidCipherText);
    }

    let pad = buf[buf.len() - 1] as usize;
    if pad == 0 || pad > BLOCK_SIZE {
        return Err(Error::InvalidCipherText);
    }

    if buf[buf.len() - pad..].iter().any(|&b| b as usize != pad) {
        return Err(Error::InvalidCipherText);
    }

    buf.truncate(buf.len() - pad);

    Ok(())
}

/// Compares a computed tag against a claimed one without leaking timing.
pub(crate) fn tags_match(computed: &[u8], claimed: &[u8]) -> bool {
    computed.ct_eq(claimed).into()
}

/// Splits a message into `(iv, ciphertext, tag)`.
pub(crate) fn split_message(message: &[u8]) -> Result<(&[u8; IV_SIZE], &[u8], &[u8]), Error> {
    if message.len() < IV_SIZE + TAG_SIZE {
        return Err(Error::InvalidArgument(format!(
            "message of {} bytes cannot hold an IV and a tag",
            message.len()
        )));
    }

    let (iv, rest) = message.split_at(IV_SIZE);
    let (ct, tag) = rest.split_at(rest.len() - TAG_SIZE);

    Ok((iv.try_into()?, ct, tag))
}

/// Checks that an authenticated ciphertext body is a non-empty sequence of blocks.
pub(crate) fn ciphertext_len_checked(len: usize) -> Result<(), Error> {
    if len == 0 || len % BLOCK_SIZE != 0 {
        return Err(Error::InvalidArgument(format!(
            "ciphertext of {len} bytes is not a whole number of blocks"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_unpad() {
        for len in 0..BLOCK_SIZE {
            let tail = vec![0xAB; len];
            let mut block = pad_block(&tail).to_vec();
            assert_eq!(block[BLOCK_SIZE - 1] as usize, BLOCK_SIZE - len);

            unpad(&mut block).unwrap();
            assert_eq!(block, tail);
        }
    }

    #[test]
    fn test_unpad_rejects_malformed() {
        let mut zero = vec![0u8; BLOCK_SIZE];
        assert!(matches!(unpad(&mut zero), Err(Error::InvalidCipherText)));

        let mut too_long = vec![17u8; BLOCK_SIZE];
        assert!(matches!(unpad(&mut too_long), Err(Error::InvalidCipherText)));

        let mut inconsistent = vec![3u8; BLOCK_SIZE];
        inconsistent[BLOCK_SIZE - 2] = 2;
        assert!(matches!(
            unpad(&mut inconsistent),
            Err(Error::InvalidCipherText)
        ));

        let mut empty = Vec::new();
        assert!(matches!(unpad(&mut empty), Err(Error::InvalidCipherText)));
    }

    #[test]
    fn test_split_message() {
        let msg: Vec<u8> = (0..MIN_MESSAGE_SIZE as u8).collect();
        let (iv, ct, tag) = split_message(&msg).unwrap();

        assert_eq!(iv[0], 0);
        assert_eq!(ct.len(), BLOCK_SIZE);
        assert_eq!(tag.len(), TAG_SIZE);
        assert_eq!(tag[TAG_SIZE - 1], MIN_MESSAGE_SIZE as u8 - 1);

        assert!(matches!(
            split_message(&msg[..IV_SIZE + TAG_SIZE - 1]),
            Err(Error::InvalidArgument(_))
        ));
    }
}
