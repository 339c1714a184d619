use crate::*;
use num_bigint::BigUint;

/// Multi-recipient ElGamal public key `(pk_0, ..., pk_{k-1})`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(transparent)]
pub struct ElGamalPublicKey(#[serde(with = "biguint_hex_vec")] Vec<BigUint>);

impl ElGamalPublicKey {
    pub fn new(elements: Vec<BigUint>) -> Result<Self, Error> {
        if elements.is_empty() {
            return Err(Error::invalid("an ElGamal public key needs at least one element"));
        }
        Ok(ElGamalPublicKey(elements))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn elements(&self) -> &[BigUint] {
        &self.0
    }

    pub fn belongs_to(&self, group: &GqGroup) -> bool {
        !self.0.is_empty() && self.0.iter().all(|pk| group.is_member(pk))
    }

    /// Product of the first `n` key elements
    ///
    /// Decrypting a ciphertext whose phis were multiplied together needs exactly this key.
    pub fn compress(&self, n: usize, group: &GqGroup) -> Result<BigUint, Error> {
        if n == 0 || n > self.0.len() {
            return Err(Error::invalid(format!(
                "cannot compress {} key elements out of {}",
                n,
                self.0.len()
            )));
        }
        Ok(group.product(&self.0[..n]))
    }
}

/// Multi-recipient ElGamal ciphertext `(gamma, phi_0, ..., phi_{l-1})`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ElGamalCiphertext {
    #[serde(with = "biguint_hex")]
    pub gamma: BigUint,

    #[serde(with = "biguint_hex_vec")]
    pub phis: Vec<BigUint>,
}

impl ElGamalCiphertext {
    /// Encrypt `messages` with randomness `r`: `(g^r, pk_i^r * m_i)`
    pub fn encrypt(
        group: &GqGroup,
        messages: &[BigUint],
        r: &BigUint,
        public_key: &ElGamalPublicKey,
    ) -> Result<Self, Error> {
        if messages.is_empty() {
            return Err(Error::invalid("cannot encrypt an empty message"));
        }
        if messages.len() > public_key.len() {
            return Err(Error::invalid(format!(
                "message of {} elements does not fit a public key of {} elements",
                messages.len(),
                public_key.len()
            )));
        }
        if !group.is_exponent(r) {
            return Err(Error::invalid("encryption randomness is not in Zq"));
        }
        if !messages.iter().all(|m| group.is_member(m)) {
            return Err(Error::invalid("message elements must belong to the group"));
        }

        let gamma = group.generator_pow(r);
        let phis = messages
            .iter()
            .zip(public_key.elements())
            .map(|(m, pk)| group.multiply(&group.exponentiate(pk, r), m))
            .collect();

        Ok(ElGamalCiphertext { gamma, phis })
    }

    pub fn size(&self) -> usize {
        self.phis.len()
    }

    /// Raise every component to `exponent`
    pub fn exponentiate(&self, exponent: &BigUint, group: &GqGroup) -> Self {
        ElGamalCiphertext {
            gamma: group.exponentiate(&self.gamma, exponent),
            phis: self
                .phis
                .iter()
                .map(|phi| group.exponentiate(phi, exponent))
                .collect(),
        }
    }

    /// Restriction to `(gamma, phi_0)`
    pub fn first_component(&self) -> Self {
        ElGamalCiphertext {
            gamma: self.gamma.clone(),
            phis: self.phis.iter().take(1).cloned().collect(),
        }
    }

    /// `(gamma, prod phi_i)`: an encryption of the product of the plaintexts
    /// under the compressed public key
    pub fn combine_phis(&self, group: &GqGroup) -> Self {
        ElGamalCiphertext {
            gamma: self.gamma.clone(),
            phis: vec![group.product(&self.phis)],
        }
    }

    pub fn belongs_to(&self, group: &GqGroup) -> bool {
        group.is_member(&self.gamma) && self.phis.iter().all(|phi| group.is_member(phi))
    }

    /// Decrypt with the secret key elements matching the public key
    ///
    /// Only the reference server in the tests holds these keys.
    #[cfg(test)]
    pub(crate) fn decrypt(&self, secret_key: &[BigUint], group: &GqGroup) -> Result<Vec<BigUint>, Error> {
        if secret_key.len() < self.phis.len() {
            return Err(Error::invalid("secret key is shorter than the ciphertext"));
        }
        Ok(self
            .phis
            .iter()
            .zip(secret_key)
            .map(|(phi, sk)| {
                let shared = group.exponentiate(&self.gamma, sk);
                group.multiply(phi, &group.invert(&shared))
            })
            .collect())
    }
}

impl From<&ElGamalCiphertext> for Hashable {
    fn from(c: &ElGamalCiphertext) -> Self {
        let mut values = Vec::with_capacity(c.phis.len() + 1);
        values.push(Hashable::from(&c.gamma));
        values.extend(c.phis.iter().map(Hashable::from));
        Hashable::Sequence(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::fixtures::*;

    fn keypair(group: &GqGroup, n: usize) -> (Vec<BigUint>, ElGamalPublicKey) {
        let mut rng = rand::thread_rng();
        let secret: Vec<BigUint> = (0..n).map(|_| group.random_exponent(&mut rng)).collect();
        let public = secret.iter().map(|sk| group.generator_pow(sk)).collect();
        (secret, ElGamalPublicKey::new(public).unwrap())
    }

    fn messages(n: usize) -> Vec<BigUint> {
        SMALL_QR_PRIMES[..n].iter().map(|p| BigUint::from(*p)).collect()
    }

    #[test]
    fn encrypt_decrypt() {
        let group = test_group();
        let (secret, public) = keypair(&group, 3);
        let r = group.random_exponent(&mut rand::thread_rng());

        let m = messages(2);
        let c = ElGamalCiphertext::encrypt(&group, &m, &r, &public).unwrap();
        assert_eq!(c.size(), 2);
        assert!(c.belongs_to(&group));
        assert_eq!(c.decrypt(&secret, &group).unwrap(), m);

        // Too many messages for the key
        assert!(ElGamalCiphertext::encrypt(&group, &messages(4), &r, &public).is_err());
        // Empty message
        assert!(ElGamalCiphertext::encrypt(&group, &[], &r, &public).is_err());
        // Randomness outside Zq
        assert!(ElGamalCiphertext::encrypt(&group, &m, group.q(), &public).is_err());
        // Non-member message
        let bad = vec![BigUint::from(5u32)];
        assert!(ElGamalCiphertext::encrypt(&group, &bad, &r, &public).is_err());
    }

    #[test]
    fn combined_phis_decrypt_under_compressed_key() {
        let group = test_group();
        let (secret, public) = keypair(&group, 3);
        let r = group.random_exponent(&mut rand::thread_rng());
        let m = messages(3);

        let c = ElGamalCiphertext::encrypt(&group, &m, &r, &public).unwrap();
        let combined = c.combine_phis(&group);
        let compressed_secret: BigUint = secret.iter().fold(BigUint::from(0u32), |acc, x| acc + x);
        let compressed_secret = compressed_secret % group.q();

        assert_eq!(
            group.generator_pow(&compressed_secret),
            public.compress(3, &group).unwrap()
        );
        let plain = combined.decrypt(&[compressed_secret], &group).unwrap();
        assert_eq!(plain, vec![group.product(&m)]);

        assert!(public.compress(0, &group).is_err());
        assert!(public.compress(4, &group).is_err());
    }

    #[test]
    fn exponentiation_and_restriction() {
        let group = test_group();
        let (secret, public) = keypair(&group, 2);
        let mut rng = rand::thread_rng();
        let r = group.random_exponent(&mut rng);
        let k = group.random_exponent(&mut rng);
        let m = messages(2);

        let c = ElGamalCiphertext::encrypt(&group, &m, &r, &public).unwrap();
        let first = c.first_component();
        assert_eq!(first.size(), 1);
        assert_eq!(first.gamma, c.gamma);

        let raised = first.exponentiate(&k, &group);
        let plain = raised.decrypt(&secret, &group).unwrap();
        assert_eq!(plain, vec![group.exponentiate(&m[0], &k)]);
    }

    #[test]
    fn serde_format() {
        let c = ElGamalCiphertext {
            gamma: BigUint::from(10u32),
            phis: vec![BigUint::from(11u32)],
        };
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, r#"{"gamma":"0xa","phis":["0xb"]}"#);

        let key = ElGamalPublicKey::new(vec![BigUint::from(3u32)]).unwrap();
        assert_eq!(serde_json::to_string(&key).unwrap(), r#"["0x3"]"#);
        assert!(ElGamalPublicKey::new(vec![]).is_err());
    }
}
