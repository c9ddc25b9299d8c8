//! Control-channel framing: `[len:u16 LE][Blowfish-encrypted body]`, the
//! body padded to the block size with an XOR checksum in its final word.

use anyhow::{bail, Context};
use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use aden_protocol::codec::{append_checksum, padded_body_len, verify_checksum, HEADER_SIZE};
use aden_protocol::{Encode, Packet, PacketFrame};

use crate::crypt::ControlCipher;

/// Upper bound on a control body; anything larger is a broken peer.
const MAX_CONTROL_BODY: usize = 8192;

pub async fn write_control_packet<W, P>(
    w: &mut W,
    cipher: &ControlCipher,
    packet: &P,
) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
    P: Packet + Encode,
{
    let mut body = Vec::new();
    packet
        .encode_with_id(&mut body)
        .with_context(|| format!("encoding control packet '{}'", P::NAME))?;

    let padded = padded_body_len(body.len());
    body.resize(padded, 0);
    append_checksum(&mut body);
    cipher.encrypt(&mut body);

    let wire_len = (HEADER_SIZE + body.len()) as u16;
    w.write_all(&wire_len.to_le_bytes()).await?;
    w.write_all(&body).await?;

    Ok(())
}

pub async fn read_control_packet<R>(
    r: &mut R,
    cipher: &ControlCipher,
) -> anyhow::Result<PacketFrame>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; HEADER_SIZE];
    r.read_exact(&mut header).await?;

    let wire_len = u16::from_le_bytes(header) as usize;

    if wire_len <= HEADER_SIZE {
        bail!("invalid control packet length {wire_len}");
    }

    let body_len = wire_len - HEADER_SIZE;

    if body_len > MAX_CONTROL_BODY || body_len % 8 != 0 {
        bail!("control body of {body_len} bytes is malformed");
    }

    let mut body = vec![0u8; body_len];
    r.read_exact(&mut body).await?;

    cipher.decrypt(&mut body);

    if !verify_checksum(&body) {
        bail!("control packet checksum mismatch");
    }

    let opcode = body[0];

    Ok(PacketFrame {
        opcode,
        body: BytesMut::from(&body[1..]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packets::gs2ls::PlayerLogout;

    #[tokio::test]
    async fn control_frames_round_trip() {
        let cipher = ControlCipher::static_key();

        let mut wire = Vec::new();
        write_control_packet(
            &mut wire,
            &cipher,
            &PlayerLogout {
                account: "acct1".into(),
            },
        )
        .await
        .unwrap();

        // Body is block-aligned and encrypted.
        assert_eq!((wire.len() - HEADER_SIZE) % 8, 0);

        let mut r = &wire[..];
        let mut frame = read_control_packet(&mut r, &cipher).await.unwrap();

        let pkt: PlayerLogout = frame.decode().unwrap();
        assert_eq!(pkt.account, "acct1");
    }

    #[tokio::test]
    async fn wrong_key_fails_the_checksum() {
        let mut wire = Vec::new();
        write_control_packet(
            &mut wire,
            &ControlCipher::static_key(),
            &PlayerLogout {
                account: "acct1".into(),
            },
        )
        .await
        .unwrap();

        let other = ControlCipher::new(b"not-the-same-key").unwrap();
        let mut r = &wire[..];
        assert!(read_control_packet(&mut r, &other).await.is_err());
    }
}
