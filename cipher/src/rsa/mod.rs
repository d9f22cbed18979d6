//! RSA
//!
//! - 随机选择两个质数$p$和$q$($p > q$), 且$p*q$的位数恰好等于要求的位数, 模数$n=p*q$;
//! - 公钥指数$e$与$(p-1)(q-1)$互质;
//! - 私钥指数$d$满足: $d*e \equiv 1 \mod (p-1)(q-1)$;
//!
//! 加密: $y = x ^ e \mod n$;
//!
//! 解密: $x = y ^ d \mod n$;
//!
//! 明文先在最前面补一个随机的非零字节再转成大整数$x$. $x$可以大于$n$: 把$x$按$n$进制拆成若干位,
//! 每一位单独做模幂, 再按同样的权重拼回去, 所以一次调用可以处理任意长度的明文. 这不是OAEP/PKCS1
//! 那样的标准填充.
//!

mod key;
pub use key::{
    ExposesPublic, Key, KeyPair, PrivateKey, PublicKey, RsaKey, DEFAULT_KEY_BITS,
    DEFAULT_PUBLIC_EXPONENT, MIN_KEY_BITS,
};

mod transform;
pub use transform::{decrypt_with, encrypt_with, pad, transform, unpad, Rsa};

mod sign;
pub use sign::{RsaSign, RsaVerify, SALT_LEN};

#[cfg(test)]
mod tests;
