//! QBFT header extra data
//!
//! QBFT headers store an RLP list in their extra data:
//!
//! ```text
//! [vanity, [validator, ...], vote | [], round, [committed_seal, ...]]
//! vote = [recipient_address, vote_type]
//! ```
//!
//! An absent vote is encoded as the empty list.

use alloy_consensus::Header;
use alloy_primitives::{Address, Bytes};
use alloy_rlp::{
    BufMut, Decodable, EMPTY_LIST_CODE, Encodable, Header as RlpHeader, RlpDecodable,
    RlpEncodable,
};

use crate::constants::{QBFT_AUTH_VOTE, QBFT_DROP_VOTE};

/// A validator vote embedded in a QBFT header
#[derive(Debug, Clone, Copy, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct ValidatorVote {
    /// Account being voted on
    pub recipient_address: Address,
    /// [`QBFT_AUTH_VOTE`] or [`QBFT_DROP_VOTE`]
    pub vote_type: u8,
}

impl ValidatorVote {
    /// Vote to authorize `recipient_address`
    pub const fn authorize(recipient_address: Address) -> Self {
        Self { recipient_address, vote_type: QBFT_AUTH_VOTE }
    }

    /// Vote to deauthorize `recipient_address`
    pub const fn deauthorize(recipient_address: Address) -> Self {
        Self { recipient_address, vote_type: QBFT_DROP_VOTE }
    }

    /// Decoded intent: `Some(true)` to authorize, `Some(false)` to
    /// deauthorize, `None` for an unknown vote type
    pub const fn intent(&self) -> Option<bool> {
        match self.vote_type {
            QBFT_AUTH_VOTE => Some(true),
            QBFT_DROP_VOTE => Some(false),
            _ => None,
        }
    }
}

/// Decoded QBFT extra data
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QbftExtra {
    /// Free-form vanity bytes
    pub vanity: Bytes,
    /// Validator list of the block
    pub validators: Vec<Address>,
    /// Optional authorization vote
    pub vote: Option<ValidatorVote>,
    /// Consensus round the block was committed in
    pub round: u32,
    /// Commit seals of the validators
    pub committed_seals: Vec<Bytes>,
}

impl QbftExtra {
    /// Decode the extra data of a header. Trailing bytes are rejected.
    pub fn from_header(header: &Header) -> alloy_rlp::Result<Self> {
        let mut buf: &[u8] = &header.extra_data;
        let extra = Self::decode(&mut buf)?;
        if !buf.is_empty() {
            return Err(alloy_rlp::Error::UnexpectedLength);
        }
        Ok(extra)
    }

    /// Encode into header extra data
    pub fn to_bytes(&self) -> Bytes {
        alloy_rlp::encode(self).into()
    }

    fn payload_length(&self) -> usize {
        self.vanity.length()
            + self.validators.length()
            + self.vote.as_ref().map_or(1, |vote| vote.length())
            + self.round.length()
            + self.committed_seals.length()
    }
}

impl Encodable for QbftExtra {
    fn encode(&self, out: &mut dyn BufMut) {
        RlpHeader { list: true, payload_length: self.payload_length() }.encode(out);
        self.vanity.encode(out);
        self.validators.encode(out);
        match &self.vote {
            Some(vote) => vote.encode(out),
            None => out.put_u8(EMPTY_LIST_CODE),
        }
        self.round.encode(out);
        self.committed_seals.encode(out);
    }

    fn length(&self) -> usize {
        let payload_length = self.payload_length();
        payload_length + alloy_rlp::length_of_length(payload_length)
    }
}

impl Decodable for QbftExtra {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let header = RlpHeader::decode(buf)?;
        if !header.list {
            return Err(alloy_rlp::Error::UnexpectedString);
        }
        if buf.len() < header.payload_length {
            return Err(alloy_rlp::Error::InputTooShort);
        }

        let (mut body, rest) = buf.split_at(header.payload_length);
        let extra = Self {
            vanity: Bytes::decode(&mut body)?,
            validators: Vec::<Address>::decode(&mut body)?,
            vote: decode_optional_vote(&mut body)?,
            round: u32::decode(&mut body)?,
            committed_seals: Vec::<Bytes>::decode(&mut body)?,
        };
        if !body.is_empty() {
            return Err(alloy_rlp::Error::ListLengthMismatch {
                expected: header.payload_length,
                got: header.payload_length - body.len(),
            });
        }

        *buf = rest;
        Ok(extra)
    }
}

fn decode_optional_vote(buf: &mut &[u8]) -> alloy_rlp::Result<Option<ValidatorVote>> {
    match buf.first() {
        Some(&EMPTY_LIST_CODE) => {
            *buf = &buf[1..];
            Ok(None)
        }
        Some(_) => ValidatorVote::decode(buf).map(Some),
        None => Err(alloy_rlp::Error::InputTooShort),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_with_extra(extra: Bytes) -> Header {
        Header { extra_data: extra, ..Default::default() }
    }

    #[test]
    fn test_vote_intent() {
        let recipient = Address::repeat_byte(1);
        assert_eq!(ValidatorVote::authorize(recipient).intent(), Some(true));
        assert_eq!(ValidatorVote::deauthorize(recipient).intent(), Some(false));
        assert_eq!(ValidatorVote { recipient_address: recipient, vote_type: 7 }.intent(), None);
    }

    #[test]
    fn test_extra_with_vote() {
        let extra = QbftExtra {
            vanity: Bytes::from(vec![0u8; 32]),
            validators: vec![Address::repeat_byte(1), Address::repeat_byte(2)],
            vote: Some(ValidatorVote::authorize(Address::repeat_byte(3))),
            round: 2,
            committed_seals: vec![Bytes::from(vec![0xaa; 65])],
        };

        let decoded = QbftExtra::from_header(&header_with_extra(extra.to_bytes())).unwrap();
        assert_eq!(decoded, extra);
        assert_eq!(extra.length(), extra.to_bytes().len());
    }

    #[test]
    fn test_missing_vote_is_empty_list() {
        let extra = QbftExtra::default();
        let bytes = extra.to_bytes();

        // [vanity="", validators=[], vote=[], round=0, seals=[]]
        assert_eq!(&bytes[..], &[0xc5, 0x80, 0xc0, 0xc0, 0x80, 0xc0]);
        assert_eq!(QbftExtra::from_header(&header_with_extra(bytes)).unwrap().vote, None);
    }

    #[test]
    fn test_malformed_extra_rejected() {
        // not a list
        assert!(QbftExtra::from_header(&header_with_extra(Bytes::from_static(&[0x80]))).is_err());
        // empty
        assert!(QbftExtra::from_header(&header_with_extra(Bytes::new())).is_err());
        // truncated
        let mut bytes = QbftExtra::default().to_bytes().to_vec();
        bytes.pop();
        assert!(QbftExtra::from_header(&header_with_extra(bytes.into())).is_err());
        // trailing data
        let mut bytes = QbftExtra::default().to_bytes().to_vec();
        bytes.push(0x80);
        assert!(QbftExtra::from_header(&header_with_extra(bytes.into())).is_err());
    }
}
