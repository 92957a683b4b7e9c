//! Cross-crate integration tests exercising the full pipeline:
//! typed args -> instruction data -> account bytes -> typed record.
//!
//! The layouts below stand in for a small escrow program and for the SPL
//! token account, and go through the public API of both crates.

use program_client::*;
use program_codec::{
    account_discriminator, codec_enum, codec_records, codec_struct, instruction_discriminator,
    Codec, CodecError, COption, Field, FixedString, Layout, Record, RecordLayout, Registry,
    StructLayout, Value,
};

const ESCROW_PROGRAM: &str = "Escrow1111111111111111111111111111111111111";

fn escrow_program() -> Pubkey {
    parse_address(ESCROW_PROGRAM).unwrap()
}

fn maker() -> Pubkey {
    let signing = ed25519_dalek::SigningKey::from_bytes(&[0x11; 32]);
    Pubkey::new_from_array(signing.verifying_key().to_bytes())
}

// ─── Escrow layouts ────────────────────────────────────────────────

codec_struct! {
    #[derive(Debug, Clone, PartialEq)]
    pub struct Escrow {
        pub maker: Pubkey,
        pub mint: Pubkey,
        pub amount: u64,
        pub label: FixedString<16>,
        pub taker: Option<Pubkey>,
        pub bump: u8,
    }
}

impl Record for Escrow {
    const DISCRIMINATOR: &'static [u8] = &[31, 213, 123, 187, 186, 22, 218, 155];
}

codec_struct! {
    #[derive(Debug, Clone, PartialEq)]
    pub struct EscrowConfig {
        pub admin: Pubkey,
        pub fee_bps: u16,
    }
}

impl Record for EscrowConfig {
    const DISCRIMINATOR: &'static [u8] = &[138, 174, 227, 187, 239, 148, 1, 44];
}

codec_records! {
    #[derive(Debug, PartialEq)]
    pub enum EscrowAccount {
        Escrow(Escrow),
        Config(EscrowConfig),
    }
}

codec_struct! {
    #[derive(Debug, Clone, PartialEq)]
    pub struct MakeArgs {
        pub amount: u64,
        pub label: String,
    }
}

impl Record for MakeArgs {
    const DISCRIMINATOR: &'static [u8] = &[138, 227, 232, 77, 223, 166, 96, 197];
}

codec_enum! {
    #[derive(Debug, Clone, PartialEq)]
    pub enum LegacyInstruction {
        Cancel = 0,
        Take { expected_amount: u64 } = 1,
    }
}

fn escrow_account(escrow: &Escrow, address: Pubkey) -> AccountData {
    let mut data = escrow.to_record_bytes().unwrap();
    // Accounts are allocated with room to grow.
    data.resize(256, 0);
    AccountData::new(address, escrow_program(), 2_039_280, data)
}

// ─── Discriminators ────────────────────────────────────────────────

#[test]
fn discriminators_are_anchor_derived() {
    assert_eq!(Escrow::DISCRIMINATOR, account_discriminator("Escrow"));
    assert_eq!(EscrowConfig::DISCRIMINATOR, account_discriminator("EscrowConfig"));
    assert_eq!(MakeArgs::DISCRIMINATOR, instruction_discriminator("make"));
}

// ─── Forward path: args -> instruction ─────────────────────────────

#[test]
fn make_instruction_pipeline() {
    let mint = Pubkey::new_from_array([0xbb; 32]);
    let (escrow_pda, bump) = find_program_address(&[b"escrow", maker().as_ref(), mint.as_ref()], &escrow_program()).unwrap();
    assert!(!is_on_curve(escrow_pda.as_array()));
    assert!(is_on_curve(maker().as_array()));

    let vault = associated_token_address(&escrow_pda, &mint).unwrap();
    let args = MakeArgs {
        amount: 1_000_000,
        label: "first".into(),
    };
    let ix = Instruction::new_with_record(
        escrow_program(),
        &args,
        vec![
            AccountMeta::signer(maker()),
            AccountMeta::new(escrow_pda),
            AccountMeta::new(vault),
            AccountMeta::new_readonly(mint),
            AccountMeta::new_readonly(TOKEN_PROGRAM_ID),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID),
        ],
    )
    .unwrap();

    assert_eq!(ix.data.len(), 8 + 8 + 4 + 5);
    assert_eq!(ix.signers().copied().collect::<Vec<_>>(), vec![maker()]);
    assert_eq!(decode_instruction_data::<MakeArgs>(&ix).unwrap(), args);

    // The bump the client found re-derives the same address.
    let again = create_program_address(&[b"escrow", maker().as_ref(), mint.as_ref(), &[bump]], &escrow_program()).unwrap();
    assert_eq!(again, escrow_pda);
}

#[test]
fn legacy_enum_instruction() {
    let ix = Instruction::new_with_codec(
        escrow_program(),
        &LegacyInstruction::Take { expected_amount: 7 },
        vec![AccountMeta::readonly_signer(maker())],
    )
    .unwrap();
    assert_eq!(ix.data[0], 1);
    assert_eq!(
        LegacyInstruction::from_bytes_exact(&ix.data).unwrap(),
        LegacyInstruction::Take { expected_amount: 7 }
    );
    assert_eq!(
        LegacyInstruction::from_bytes(&[3]).unwrap_err(),
        CodecError::UnknownVariant(3)
    );
}

// ─── Reverse path: account bytes -> record ─────────────────────────

fn sample_escrow() -> Escrow {
    Escrow {
        maker: maker(),
        mint: Pubkey::new_from_array([0xbb; 32]),
        amount: 500,
        label: FixedString::new("hi").unwrap(),
        taker: None,
        bump: 254,
    }
}

#[test]
fn decode_escrow_account() {
    let escrow = sample_escrow();
    let account = escrow_account(&escrow, Pubkey::new_from_array([1; 32]));

    let (decoded, consumed) = decode_account_with_offset::<Escrow>(&account, &escrow_program()).unwrap();
    assert_eq!(decoded, escrow);
    assert_eq!(consumed, 8 + 32 + 32 + 8 + 16 + 1 + 1);
    assert_eq!(decoded.label.as_str(), "hi");
}

#[test]
fn account_from_wrong_program_is_rejected() {
    let account = escrow_account(&sample_escrow(), Pubkey::new_from_array([1; 32]));
    let err = decode_account::<Escrow>(&account, &TOKEN_PROGRAM_ID).unwrap_err();
    assert!(matches!(err, ClientError::OwnerMismatch { .. }));
}

#[test]
fn account_of_wrong_type_is_rejected() {
    let account = escrow_account(&sample_escrow(), Pubkey::new_from_array([1; 32]));
    let err = decode_account::<EscrowConfig>(&account, &escrow_program()).unwrap_err();
    assert!(matches!(
        err,
        ClientError::Codec(CodecError::DiscriminatorMismatch { .. })
    ));
}

#[test]
fn route_accounts_by_discriminator() {
    let config = EscrowConfig {
        admin: maker(),
        fee_bps: 25,
    };
    let bytes = config.to_record_bytes().unwrap();
    let (account, _) = EscrowAccount::decode_any(&bytes).unwrap();
    assert_eq!(account, EscrowAccount::Config(config));

    let (account, _) = EscrowAccount::decode_any(&sample_escrow().to_record_bytes().unwrap()).unwrap();
    assert_eq!(account.record_name(), "Escrow");

    let err = EscrowAccount::decode_any(&[0u8; 16]).unwrap_err();
    assert_eq!(err, CodecError::UnknownDiscriminator(vec![0u8; 8]));
}

// ─── Runtime layouts against typed layouts ─────────────────────────

fn escrow_layout() -> RecordLayout {
    let payload = StructLayout::new(
        "Escrow",
        vec![
            Field::new("maker", Layout::Pubkey),
            Field::new("mint", Layout::Pubkey),
            Field::new("amount", Layout::U64),
            Field::new("label", Layout::FixedString(16)),
            Field::new("taker", Layout::option(Layout::Pubkey)),
            Field::new("bump", Layout::U8),
        ],
    )
    .unwrap();
    RecordLayout::new(account_discriminator("Escrow"), payload).unwrap()
}

#[test]
fn registry_decodes_what_typed_codec_wrote() {
    let mut registry = Registry::new();
    registry.register(escrow_layout()).unwrap();

    let account = escrow_account(&sample_escrow(), Pubkey::new_from_array([1; 32]));
    let decoded = registry.decode(&account.data).unwrap();
    assert_eq!(decoded.name, "Escrow");
    assert_eq!(decoded.consumed, 98);
    assert_eq!(decoded.value.field("amount").and_then(Value::as_u128), Some(500));
    assert_eq!(decoded.value.field("label").and_then(Value::as_str), Some("hi"));

    let json: serde_json::Value = serde_json::from_str(&decoded.value.to_json_pretty().unwrap()).unwrap();
    assert_eq!(json["maker"], maker().to_string());
    assert_eq!(json["bump"], 254);
    assert!(json["taker"].is_null());

    // And back: the dynamic encoder writes the same bytes.
    let rewritten = escrow_layout().encode(&decoded.value).unwrap();
    assert_eq!(rewritten, account.data[..decoded.consumed]);
}

// ─── SPL token account (COption slots) ─────────────────────────────

codec_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum AccountState {
        Uninitialized = 0,
        Initialized = 1,
        Frozen = 2,
    }
}

codec_struct! {
    #[derive(Debug, Clone, PartialEq)]
    pub struct TokenAccount {
        pub mint: Pubkey,
        pub owner: Pubkey,
        pub amount: u64,
        pub delegate: COption<Pubkey>,
        pub state: AccountState,
        pub is_native: COption<u64>,
        pub delegated_amount: u64,
        pub close_authority: COption<Pubkey>,
    }
}

#[test]
fn token_account_is_165_bytes() {
    assert_eq!(TokenAccount::FIXED_SIZE, Some(165));

    let mint = Pubkey::new_from_array([0xbb; 32]);
    let account = TokenAccount {
        mint,
        owner: maker(),
        amount: 42,
        delegate: COption::none(),
        state: AccountState::Initialized,
        is_native: COption::none(),
        delegated_amount: 0,
        close_authority: COption::some(maker()),
    };
    let bytes = account.to_bytes().unwrap();
    assert_eq!(bytes.len(), 165);
    // amount sits right after the two keys
    assert_eq!(&bytes[64..72], &42u64.to_le_bytes());
    assert_eq!(bytes[108], 1);

    let ata = associated_token_address(&maker(), &mint).unwrap();
    let raw = AccountData::new(ata, TOKEN_PROGRAM_ID, 2_039_280, bytes);
    raw.check_owner(&TOKEN_PROGRAM_ID).unwrap();
    assert_eq!(TokenAccount::from_bytes_exact(&raw.data).unwrap(), account);
}
