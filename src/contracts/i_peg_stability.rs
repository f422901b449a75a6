use ethers::prelude::abigen;

abigen!(
    IPegStability,
    r#"[
        function deposit(address peggedToken, address synthToken, uint256 amount) external
        function withdraw(address peggedToken, address synthToken, uint256 amount) external
        function isPegged(address peggedToken, address synthToken) external view returns (bool)
        function transactionFee() external view returns (uint256)
    ]"#
);
