mod every_key_family {
    use crate::{
        crypto::{Key, KeyMaterial},
        error::JwtError,
        tests::{
            fixtures::Keys,
            helpers::{payload_of, with_payload},
        },
        token::{encode, split},
        verify::{decode, verify},
    };
    use serde_json::json;

    #[test]
    fn it_signs_with_the_algorithm_of_the_key() {
        let keys = Keys::new();

        for (algorithm, key) in keys.all() {
            assert_eq!(key.jwt_algorithm().to_string(), algorithm);

            let token = encode(&json!({"sub": "123"}), Some(key), Some("kid-1")).unwrap();
            let header = split(&token).unwrap().decode_header().unwrap();
            assert_eq!(header.alg, algorithm);
            assert_eq!(header.typ, "JWT");
            assert_eq!(header.key_id(), "kid-1");

            let payload = verify(&token, &key.to_public()).unwrap();
            assert_eq!(payload, br#"{"sub":"123"}"#);
        }
    }

    #[test]
    fn it_rejects_a_tampered_payload_for_every_key() {
        let keys = Keys::new();

        for (_, key) in keys.all() {
            let token = encode(&json!({"sub": "123", "admin": false}), Some(key), None).unwrap();
            let forged = with_payload(&token, &json!({"sub": "123", "admin": true}));

            assert_eq!(payload_of(&forged)["admin"], true);
            assert!(matches!(
                verify(&forged, &key.to_public()),
                Err(JwtError::BadSignature)
            ));
        }
    }

    #[test]
    fn it_refuses_a_key_of_another_algorithm() {
        let keys = Keys::new();
        let token = encode(&json!({}), Some(&keys.p256), None).unwrap();

        for key in [&keys.hmac, &keys.rsa, &keys.p384, &keys.p521] {
            assert!(matches!(
                verify(&token, key),
                Err(JwtError::AlgorithmMismatch { found, .. }) if found == "ES256"
            ));
        }
    }

    #[test]
    fn it_will_not_accept_an_unsigned_token_where_a_key_is_expected() {
        let keys = Keys::new();
        let token = encode(&json!({"sub": "123"}), None, None).unwrap();

        assert!(matches!(
            verify(&token, &keys.rsa),
            Err(JwtError::TokenNotSigned)
        ));
        assert_eq!(decode(&token).unwrap(), br#"{"sub":"123"}"#);
    }

    #[test]
    fn it_cannot_sign_with_a_public_key() {
        let keys = Keys::new();

        for key in [&keys.rsa, &keys.p256] {
            let public = key.to_public();
            assert!(!public.is_private());
            assert!(encode(&json!({}), Some(&public), None).is_err());
        }
        assert!(matches!(
            encode(&json!({}), Some(&Key::secret("")), None),
            Err(JwtError::EmptySignKey)
        ));
    }
}
