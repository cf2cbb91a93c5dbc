pub mod tlv;
