use crate::utils::error::{Error, Result};
use solana_sdk::pubkey::Pubkey;
use spl_associated_token_account::get_associated_token_address;

/// Token utility functions
pub struct TokenUtils;

impl TokenUtils {
    /// Get the associated token account for a wallet and mint
    pub fn associated_token_address(wallet: &Pubkey, mint: &Pubkey) -> Pubkey {
        get_associated_token_address(wallet, mint)
    }

    /// Scale a whole-token amount into raw base units by the mint's decimals
    pub fn scale_amount(whole: u64, decimals: u8) -> Result<u64> {
        let factor = 10u64
            .checked_pow(decimals as u32)
            .ok_or_else(|| Error::InvalidArgument(format!("Decimals too large: {}", decimals)))?;

        whole.checked_mul(factor).ok_or_else(|| {
            Error::InvalidArgument(format!(
                "Amount {} overflows at {} decimals",
                whole, decimals
            ))
        })
    }

    /// Format a raw token amount with decimals
    pub fn format_token_amount(amount: u64, decimals: u8) -> f64 {
        amount as f64 / 10_f64.powi(decimals as i32)
    }

    /// Format a raw token amount in UI format (string with proper decimal places)
    pub fn format_token_amount_ui(amount: u64, decimals: u8) -> String {
        format!(
            "{:.1$}",
            amount as f64 / 10_f64.powi(decimals as i32),
            decimals as usize
        )
    }

    /// Parse a token amount from string into raw base units
    pub fn parse_token_amount(amount: &str, decimals: u8) -> Result<u64> {
        let amount: f64 = amount
            .parse()
            .map_err(|_| Error::InvalidArgument("Invalid token amount".to_string()))?;

        let factor = 10_f64.powi(decimals as i32);
        let raw_amount = (amount * factor).round() as u64;

        Ok(raw_amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_amount() {
        // 100 whole tokens at 2 decimals (the demo mint)
        assert_eq!(TokenUtils::scale_amount(100, 2).unwrap(), 10_000);
        // 1 SOL-like amount at 9 decimals
        assert_eq!(TokenUtils::scale_amount(1, 9).unwrap(), 1_000_000_000);
        // Overflow is an error, not a wrap
        assert!(TokenUtils::scale_amount(u64::MAX, 2).is_err());
    }

    #[test]
    fn test_format_token_amount() {
        assert_eq!(TokenUtils::format_token_amount(10_000, 2), 100.0);
        assert_eq!(TokenUtils::format_token_amount(1_500_000_000, 9), 1.5);
        assert_eq!(TokenUtils::format_token_amount_ui(2_500, 2), "25.00");
    }

    #[test]
    fn test_parse_token_amount() {
        assert_eq!(TokenUtils::parse_token_amount("1.0", 9).unwrap(), 1_000_000_000);
        assert_eq!(TokenUtils::parse_token_amount("1.5", 6).unwrap(), 1_500_000);
        assert!(TokenUtils::parse_token_amount("not-a-number", 6).is_err());
    }

    #[test]
    fn test_associated_token_address_is_deterministic() {
        let wallet = Pubkey::new_unique();
        let mint = Pubkey::new_unique();

        let a = TokenUtils::associated_token_address(&wallet, &mint);
        let b = TokenUtils::associated_token_address(&wallet, &mint);
        assert_eq!(a, b);
        assert_ne!(a, TokenUtils::associated_token_address(&mint, &wallet));
    }
}
