//! ## The Cipher Block Chaining Mode(CBC) over AES-128
//!
//! $$
//! C_1 = Encrypt(P_1 \xor IV); C_j = Encrypt(P_j \xor C_{j-1}), j = 2...n
//!
//! P_1 = Decrypt(C_1) \xor IV; P_j = Decrypt(C_j) \xor C_{j-1}, j = 2...n
//! $$
//!
//! 只处理整块数据, 填充由调用者负责. 链状态跨调用保留, 所以连续多次调用等价于一次处理全部数据.

use crate::CipherError;
use aes::cipher::{generic_array::GenericArray, BlockDecrypt, BlockEncrypt, KeyInit};
use aes::Aes128;
#[cfg(feature = "sec-zeroize")]
use zeroize::Zeroize;

pub const BLOCK_SIZE: usize = 16;

pub(super) struct AesCbc {
    cipher: Aes128,
    // 上一个密文块, 初始为IV
    chain: [u8; BLOCK_SIZE],
}

impl AesCbc {
    pub(super) fn new(key: &[u8; BLOCK_SIZE], iv: [u8; BLOCK_SIZE]) -> Self {
        Self {
            cipher: Aes128::new(GenericArray::from_slice(key)),
            chain: iv,
        }
    }

    fn check_len(data: &[u8]) -> Result<(), CipherError> {
        if data.len() % BLOCK_SIZE != 0 {
            Err(CipherError::InvalidBlockSize {
                target: BLOCK_SIZE,
                real: data.len() % BLOCK_SIZE,
            })
        } else {
            Ok(())
        }
    }

    fn encrypt_inner(cipher: &Aes128, iv: &mut [u8; BLOCK_SIZE], block: &mut [u8]) {
        iv.iter_mut().zip(block.iter()).for_each(|(a, b)| *a ^= b);
        cipher.encrypt_block(GenericArray::from_mut_slice(iv.as_mut_slice()));
        block.copy_from_slice(iv.as_slice());
    }

    fn decrypt_inner(cipher: &Aes128, iv: &mut [u8; BLOCK_SIZE], block: &mut [u8]) {
        let mut c = [0u8; BLOCK_SIZE];
        c.copy_from_slice(block);
        cipher.decrypt_block(GenericArray::from_mut_slice(block));
        block.iter_mut().zip(iv.iter()).for_each(|(a, b)| *a ^= b);
        *iv = c;
    }

    /// in place, `data.len()` must be a multiple of the block size
    pub(super) fn encrypt_blocks(&mut self, data: &mut [u8]) -> Result<(), CipherError> {
        Self::check_len(data)?;
        for block in data.chunks_exact_mut(BLOCK_SIZE) {
            Self::encrypt_inner(&self.cipher, &mut self.chain, block);
        }
        Ok(())
    }

    pub(super) fn decrypt_blocks(&mut self, data: &mut [u8]) -> Result<(), CipherError> {
        Self::check_len(data)?;
        for block in data.chunks_exact_mut(BLOCK_SIZE) {
            Self::decrypt_inner(&self.cipher, &mut self.chain, block);
        }
        Ok(())
    }
}

#[cfg(feature = "sec-zeroize")]
impl Drop for AesCbc {
    fn drop(&mut self) {
        self.chain.zeroize();
    }
}
